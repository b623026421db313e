//! Room snapshots: what an observer currently knows about its surroundings
//!
//! Each candidate entity is evaluated datum by datum. The emitted map holds
//! only what was disclosed plus derived fields (`position`, capability
//! state, container contents). Anything that stayed hidden sets
//! `"object": "unknown"`.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::entities::Entity;
use crate::ids::{EntityId, RoomId};
use crate::noise::NoiseSource;
use crate::perception::{
    Datum, DatumOperator, DatumProbe, Interaction, ObserverPerception, PerceivedInfo,
    PerceptionEnvironment, SensoryChannel,
};
use crate::results::ActionError;
use crate::value_objects::{Depth, Position};

use super::interact::unknown_entity;
use super::World;

/// Shown in place of an id that could not be told apart
const UNIDENTIFIED: &str = "not uniquely identifiable at a glance";

/// Combined signal times distinctiveness needed to tell an object apart
const IDENTIFY_THRESHOLD: f64 = 0.25;

/// Observer-side inputs shared by every snapshot of one observation
struct Viewpoint<'a> {
    perception: &'a ObserverPerception,
    label: &'a str,
}

impl World {
    /// Snapshot of the observer's room at `depth`, using the interactions
    /// configured in the settings.
    pub fn perceive(
        &self,
        observer: EntityId,
        depth: Depth,
        noise: &mut dyn NoiseSource,
    ) -> Result<Vec<Value>, ActionError> {
        let interactions = self.settings().observe_interactions.clone();
        self.perceive_with(observer, depth, &interactions, noise)
    }

    /// Snapshot of the observer's room while performing `interactions`.
    ///
    /// Entities are listed in id order; the observer is never listed.
    /// Connectors are seen at their side in this room.
    pub fn perceive_with(
        &self,
        observer: EntityId,
        depth: Depth,
        interactions: &[Interaction],
        noise: &mut dyn NoiseSource,
    ) -> Result<Vec<Value>, ActionError> {
        let entity = self.entity(observer).ok_or_else(|| unknown_entity(observer))?;
        if entity.agent_state().is_none() {
            return Err(ActionError::hard(format!("{} cannot perceive.", entity.label()))
                .with_context("observer", entity.label()));
        }
        let (room, origin) = self.locate_actor(observer)?;
        Ok(self.perceive_room_from(entity, room, origin, depth, interactions, noise))
    }

    pub(super) fn perceive_room_from(
        &self,
        observer: &Entity,
        room_id: RoomId,
        origin: Position,
        depth: Depth,
        interactions: &[Interaction],
        noise: &mut dyn NoiseSource,
    ) -> Vec<Value> {
        let Some(room) = self.room(room_id) else {
            return Vec::new();
        };
        let default_perception = ObserverPerception::default();
        let viewpoint = Viewpoint {
            perception: observer
                .agent_state()
                .map(|state| state.perception())
                .unwrap_or(&default_perception),
            label: observer.label(),
        };
        let ambient = PerceptionEnvironment::new(0.0)
            .with_ambient(room.light_level(), room.ambient_noise(), room.ambient_smell())
            .with_interactions(interactions.iter().copied());

        let candidates: BTreeSet<EntityId> = room
            .entities()
            .iter()
            .chain(room.connectors().iter())
            .copied()
            .filter(|id| Some(*id) != observer.id())
            .collect();

        let mut seen = Vec::with_capacity(candidates.len());
        for id in candidates {
            let Some(entity) = self.entity(id) else {
                continue;
            };
            let position = match entity.connector_sides() {
                Some(sides) => sides.position_in(room_id),
                None => entity.position(),
            };
            let Some(position) = position else {
                continue;
            };

            let env = ambient.at_distance(origin.distance_to(&position));
            let mut info = self.snapshot(entity, &viewpoint, &env, depth, noise);
            info.insert("position", json!({ "x": position.x, "y": position.y }));
            seen.push(info.into_json());
        }

        tracing::debug!(
            observer = %viewpoint.label,
            room = %room.label(),
            depth = %depth,
            count = seen.len(),
            "Room perceived"
        );
        seen
    }

    fn snapshot(
        &self,
        entity: &Entity,
        viewpoint: &Viewpoint<'_>,
        env: &PerceptionEnvironment,
        depth: Depth,
        noise: &mut dyn NoiseSource,
    ) -> PerceivedInfo {
        let probe = DatumProbe {
            observer: viewpoint.perception,
            env,
            prominence: entity.prominence(),
            uniqueness: entity.uniqueness(),
            entity_label: entity.label(),
            observer_label: viewpoint.label,
        };
        let settings = self.settings();
        let mut info = PerceivedInfo::new();

        for datum in standard_data(entity).iter().chain(entity.extra_data()) {
            datum.perceive(&probe, depth, settings, &mut info);
        }
        if !info.is_disclosed("id") {
            info.insert("id", UNIDENTIFIED);
        }
        if !info.is_disclosed("name") {
            return info;
        }

        for capability in entity.capabilities() {
            capability.on_perceive(&mut info);
        }
        if entity.is_container() {
            self.describe_contents(entity, viewpoint, env, depth, noise, &mut info);
        }
        info
    }

    fn describe_contents(
        &self,
        container: &Entity,
        viewpoint: &Viewpoint<'_>,
        env: &PerceptionEnvironment,
        depth: Depth,
        noise: &mut dyn NoiseSource,
        info: &mut PerceivedInfo,
    ) {
        let lid = container.openable();
        let closed = lid.is_some_and(|lid| !lid.is_open());
        let visibility = match lid {
            Some(lid) if closed => lid.visibility_when_closed(),
            _ => container.visibility(),
        };

        if closed && visibility <= 0.0 && depth != Depth::Omniscient {
            info.insert("contents_count", "unknown");
            info.insert("contents", json!(["unknown"]));
            return;
        }

        let visible = depth.reduced(visibility);
        if visible == Depth::None {
            info.insert("contents_count", "unknown");
            return;
        }

        let children = container.children();
        let count = children.len();
        let rendered = visible.obfuscate_number(count as u64, noise);
        let summary = match count {
            0 => "empty".to_string(),
            1 => format!("contains {}", rendered),
            _ => format!("contains {} items", rendered),
        };
        info.insert("contents_count", summary);

        if visible >= Depth::Normal && !children.is_empty() {
            let nested = if visible >= Depth::Reveal {
                visible
            } else {
                visible.lowered(self.settings().depth_factor)
            };
            let contents: Vec<Value> = children
                .iter()
                .filter_map(|id| self.entity(*id))
                .map(|child| self.snapshot(child, viewpoint, env, nested, noise).into_json())
                .collect();
            info.insert("contents", contents);
        } else if closed {
            info.insert("contents", json!(["unknown"]));
        }
    }
}

/// Facts every entity exposes, in evaluation order.
fn standard_data(entity: &Entity) -> Vec<Datum> {
    let mut data = vec![Datum::new("name", entity.name())
        .requires(SensoryChannel::Vision, 1.0)
        .requires(SensoryChannel::Touch, 1.0)
        .with_min_depth(Depth::Minimal)
        .with_threshold(0.3)];

    if let Some(description) = entity.description() {
        data.push(
            Datum::new("description", description)
                .requires(SensoryChannel::Vision, 1.0)
                .with_min_depth(Depth::Normal)
                .with_threshold(0.4),
        );
    }
    if let Some(material) = entity.material() {
        data.push(
            Datum::new("material", material)
                .requires(SensoryChannel::Vision, 0.8)
                .requires(SensoryChannel::Touch, 1.0)
                .with_operator(DatumOperator::And)
                .with_min_depth(Depth::Basic)
                .with_threshold(0.5),
        );
    }

    data.push(
        Datum::composite("id", entity.label(), |probe| {
            let signal = probe
                .signal(SensoryChannel::Vision)
                .max(probe.signal(SensoryChannel::Touch));
            signal * (0.5 + probe.uniqueness) >= IDENTIFY_THRESHOLD
        })
        .with_min_depth(Depth::Basic),
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Openable, Usable};
    use crate::entities::{blueprints, Room};
    use crate::noise::MockNoiseSource;
    use crate::value_objects::{PerceptionMode, SimulationSettings};

    fn silent() -> MockNoiseSource {
        let mut noise = MockNoiseSource::new();
        noise.expect_gen_range().never();
        noise
    }

    fn room_with_observer(settings: SimulationSettings) -> (World, RoomId, EntityId) {
        let mut world = World::new(settings);
        let room = world
            .add_room(Room::new("hall", 10.0, 10.0).with_light(1.0))
            .unwrap();
        let observer = world.add_entity(Entity::agent("potato").at(0.0, 0.0)).unwrap();
        world.enter(observer, room).unwrap();
        (world, room, observer)
    }

    fn find<'a>(seen: &'a [Value], name: &str) -> &'a Value {
        seen.iter()
            .find(|v| v["name"] == name)
            .unwrap_or_else(|| panic!("{} not perceived in {:?}", name, seen))
    }

    #[test]
    fn glance_from_afar_hides_material() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let chest = world
            .add_entity(blueprints::wooden_chest().at(3.0, 0.0))
            .unwrap();
        world.enter(chest, room).unwrap();

        let seen = world
            .perceive_with(observer, Depth::Full, &[Interaction::Glance], &mut silent())
            .unwrap();
        let chest = find(&seen, "chest");
        assert!(chest.get("material").is_none());
        assert_eq!(chest["object"], "unknown");
        assert_eq!(chest["id"], "chest_3");
        assert_eq!(chest["position"], json!({ "x": 3.0, "y": 0.0 }));
    }

    #[test]
    fn glance_and_feel_up_close_disclose_material() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let chest = world
            .add_entity(blueprints::wooden_chest().at(0.4, 0.0))
            .unwrap();
        world.enter(chest, room).unwrap();

        let seen = world
            .perceive_with(
                observer,
                Depth::Full,
                &[Interaction::Glance, Interaction::Feel],
                &mut silent(),
            )
            .unwrap();
        let chest = find(&seen, "chest");
        assert_eq!(chest["material"], "oak wood reinforced with iron bands");
        assert_eq!(chest["state"], "closed");
        assert_eq!(chest["lock_state"], "unlocked");
    }

    #[test]
    fn observer_is_not_listed() {
        let (world, _, observer) = room_with_observer(SimulationSettings::default());
        let seen = world.perceive(observer, Depth::Full, &mut silent()).unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn low_depth_hides_description_and_id() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let vase = Entity::item("vase")
            .at(1.0, 0.0)
            .with_description("a tall blue vase");
        let vase = world.add_entity(vase).unwrap();
        world.enter(vase, room).unwrap();

        let seen = world
            .perceive_with(observer, Depth::Minimal, &[Interaction::Look], &mut silent())
            .unwrap();
        let vase = find(&seen, "vase");
        assert!(vase.get("description").is_none());
        assert_eq!(vase["id"], UNIDENTIFIED);

        let seen = world
            .perceive_with(observer, Depth::Normal, &[Interaction::Look], &mut silent())
            .unwrap();
        let vase = find(&seen, "vase");
        assert_eq!(vase["description"], "a tall blue vase");
        assert_eq!(vase["id"], "vase_3");
    }

    #[test]
    fn unnamed_entity_gets_no_enrichment() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let chest = world.add_entity(blueprints::chest().at(2.0, 2.0)).unwrap();
        world.enter(chest, room).unwrap();

        // Listening only: no channel the name needs is active
        let seen = world
            .perceive_with(observer, Depth::Full, &[Interaction::Listen], &mut silent())
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].get("name").is_none());
        assert!(seen[0].get("state").is_none());
        assert!(seen[0].get("contents_count").is_none());
        assert_eq!(seen[0]["object"], "unknown");
    }

    #[test]
    fn closed_opaque_chest_hides_contents() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let chest = world.add_entity(blueprints::chest().at(1.0, 1.0)).unwrap();
        let coin = world.add_entity(Entity::item("coin")).unwrap();
        world.add_child(chest, coin).unwrap();
        world.enter(chest, room).unwrap();

        let seen = world.perceive(observer, Depth::Full, &mut silent()).unwrap();
        let chest = find(&seen, "chest");
        assert_eq!(chest["contents_count"], "unknown");
        assert_eq!(chest["contents"], json!(["unknown"]));
    }

    #[test]
    fn open_table_lists_nested_contents() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let table = world.add_entity(blueprints::table().at(1.0, 0.0)).unwrap();
        let potato = world.add_entity(Entity::item("potato")).unwrap();
        world.add_child(table, potato).unwrap();
        world.enter(table, room).unwrap();

        let seen = world.perceive(observer, Depth::Full, &mut silent()).unwrap();
        let table = find(&seen, "table");
        assert_eq!(table["contents_count"], "contains 1");
        let contents = table["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["name"], "potato");
        // Nested entities carry no position of their own
        assert!(contents[0].get("position").is_none());
    }

    #[test]
    fn translucent_lid_reduces_depth() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let jar = Entity::container("jar")
            .at(1.0, 0.0)
            .with_capability(Openable::new(false, 0.2));
        let jar = world.add_entity(jar).unwrap();
        for _ in 0..3 {
            let bean = world.add_entity(Entity::item("bean")).unwrap();
            world.add_child(jar, bean).unwrap();
        }
        world.enter(jar, room).unwrap();

        // A faint lid drops Full down to Reduced
        let seen = world.perceive(observer, Depth::Full, &mut silent()).unwrap();
        let jar = find(&seen, "jar");
        assert_eq!(jar["contents_count"], "contains a few items");
        assert_eq!(jar["contents"], json!(["unknown"]));
    }

    #[test]
    fn many_items_use_noisy_counts() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let table = world.add_entity(blueprints::table().at(1.0, 0.0)).unwrap();
        for _ in 0..12 {
            let book = world.add_entity(Entity::item("book")).unwrap();
            world.add_child(table, book).unwrap();
        }
        world.enter(table, room).unwrap();

        let mut noise = MockNoiseSource::new();
        noise.expect_gen_range().times(1).returning(|_, max| max);
        let seen = world
            .perceive_with(observer, Depth::Normal, &[Interaction::Look], &mut noise)
            .unwrap();
        assert_eq!(find(&seen, "table")["contents_count"], "contains about 13 items");
    }

    #[test]
    fn usable_tag_is_listed() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let lever = Entity::item("lever")
            .at(1.0, 0.0)
            .with_capability(Usable::inert().with_perception_tag("pullable"));
        let lever = world.add_entity(lever).unwrap();
        world.enter(lever, room).unwrap();

        let seen = world.perceive(observer, Depth::Full, &mut silent()).unwrap();
        assert_eq!(find(&seen, "lever")["capabilities"], json!(["pullable"]));
    }

    #[test]
    fn all_mode_discloses_everything() {
        let settings = SimulationSettings::default().with_perception_mode(PerceptionMode::All);
        let (mut world, room, observer) = room_with_observer(settings);
        let chest = world
            .add_entity(blueprints::iron_chest().at(9.0, 9.0))
            .unwrap();
        world.enter(chest, room).unwrap();

        let seen = world
            .perceive_with(observer, Depth::Minimal, &[], &mut silent())
            .unwrap();
        let chest = find(&seen, "chest");
        assert_eq!(chest["material"], "forged iron");
        assert!(chest.get("object").is_none());
    }

    #[test]
    fn connectors_are_seen_at_their_side() {
        let (mut world, room, observer) = room_with_observer(SimulationSettings::default());
        let closet = world.add_room(Room::chamber()).unwrap();
        world
            .connect_rooms(room, Position::new(2.0, 0.0), closet, Position::new(0.0, 1.0), None)
            .unwrap();

        let seen = world.perceive(observer, Depth::Full, &mut silent()).unwrap();
        let door = find(&seen, "door");
        assert_eq!(door["position"], json!({ "x": 2.0, "y": 0.0 }));
        assert_eq!(door["state"], "open");
    }

    #[test]
    fn non_agents_cannot_perceive() {
        let (mut world, room, _) = room_with_observer(SimulationSettings::default());
        let rock = world.add_entity(Entity::item("rock").at(1.0, 1.0)).unwrap();
        world.enter(rock, room).unwrap();
        assert!(world
            .perceive(rock, Depth::Full, &mut silent())
            .unwrap_err()
            .is_hard());
    }
}
