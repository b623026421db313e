//! Agent-facing movement and inventory operations
//!
//! Every operation validates completely before it mutates, so a returned
//! error leaves the world as it was.

use serde_json::{json, Value};

use crate::entities::{AgentState, Entity, Placement};
use crate::ids::{EntityId, RoomId};
use crate::results::{ActionError, InteractionResult};
use crate::value_objects::Position;

use super::interact::{not_in_room, unknown_entity};
use super::World;

impl World {
    // =========================================================================
    // Floor
    // =========================================================================

    /// Pick up a loose item lying in the agent's room.
    pub fn take(&mut self, agent: EntityId, item: EntityId) -> InteractionResult {
        let (room, position) = self.locate_actor(agent)?;
        self.require_agent(agent)?;
        let entity = self.entity(item).ok_or_else(|| unknown_entity(item))?;
        let label = entity.label().to_string();

        if entity.room() != Some(room) {
            return Err(match entity.placement() {
                Placement::Container(parent) => ActionError::hard(format!(
                    "{} is not on the floor; it is inside {}.",
                    label,
                    self.label(parent)
                ))
                .with_hint("Take it from its container instead.")
                .with_context("item", label.as_str())
                .with_context("container", self.label(parent)),
                Placement::Carried(_) => ActionError::hard(format!("{} is already carried.", label))
                    .with_context("item", label.as_str()),
                _ => not_in_room(&label, "take").with_context("item", label.as_str()),
            });
        }
        self.check_reach(position, item)?;
        if !entity.is_collectible() {
            return Err(not_collectible(&label));
        }

        self.detach(item);
        self.carry(agent, item);
        Ok(format!("took {}", label))
    }

    /// Put a carried item down at the agent's position.
    pub fn drop(&mut self, agent: EntityId, item: EntityId) -> InteractionResult {
        let (room, position) = self.locate_actor(agent)?;
        let label = self.require_carried(agent, item)?;

        self.detach(item);
        if let Some(entity) = self.entity_mut(item) {
            entity.set_position(Some(position));
            entity.set_collectible(true);
            entity.set_placement(Placement::Room(room));
        }
        if let Some(room) = self.rooms.get_mut(&room) {
            room.entities_mut().insert(item);
        }
        Ok(format!("dropped {}", label))
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Take an item out of an open container within reach.
    pub fn take_from(&mut self, agent: EntityId, item: EntityId, container: EntityId) -> InteractionResult {
        let (room, position) = self.locate_actor(agent)?;
        self.require_agent(agent)?;
        let holder = self.reachable_container(room, position, container)?;
        let holder_label = holder.label().to_string();

        let entity = self.entity(item).ok_or_else(|| unknown_entity(item))?;
        let label = entity.label().to_string();
        if !holder.children().contains(&item) {
            return Err(ActionError::hard(format!("{} is not in {}.", label, holder_label))
                .with_hint("Check the container's contents in your observation.")
                .with_context("item", label.as_str())
                .with_context("container", holder_label.as_str()));
        }
        if holder.is_open() == Some(false) {
            return Err(closed_container(&holder_label));
        }
        if !entity.is_collectible() {
            return Err(not_collectible(&label));
        }

        self.detach(item);
        self.carry(agent, item);
        Ok(format!("took {} from {}", label, holder_label))
    }

    /// Put a carried item into an open container within reach.
    pub fn drop_into(&mut self, agent: EntityId, item: EntityId, container: EntityId) -> InteractionResult {
        let (room, position) = self.locate_actor(agent)?;
        let holder = self.reachable_container(room, position, container)?;
        let holder_label = holder.label().to_string();
        let holder_open = holder.is_open();
        let label = self.require_carried(agent, item)?;

        if holder_open == Some(false) {
            return Err(closed_container(&holder_label));
        }
        if item == container || self.has_descendant(item, container) {
            return Err(ActionError::hard(format!("{} cannot go inside itself.", label))
                .with_context("item", label.as_str())
                .with_context("container", holder_label.as_str()));
        }

        self.detach(item);
        if let Some(entity) = self.entity_mut(item) {
            entity.set_collectible(true);
        }
        self.add_child(container, item).map_err(|err| {
            ActionError::hard(format!("{} cannot be put into {}.", label, holder_label))
                .with_console(err.to_string())
                .with_context("item", label.as_str())
                .with_context("container", holder_label.as_str())
        })?;
        Ok(format!("put {} into {}", label, holder_label))
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Walk to a point of the current room.
    pub fn move_to_position(&mut self, agent: EntityId, target: Position) -> InteractionResult {
        let (room_id, _) = self.locate_actor(agent)?;
        let room = self.room(room_id).ok_or_else(|| {
            ActionError::hard("Your room no longer exists.").with_context("actor", self.label(agent))
        })?;
        if !room.contains_point(&target) {
            return Err(ActionError::soft(format!(
                "Position {} is outside of {}.",
                target,
                room.label()
            ))
            .with_console(format!(
                "Move rejected; {} lies outside the bounds ({}, {}) of '{}'.",
                target,
                room.extend_x(),
                room.extend_y(),
                room.label()
            ))
            .with_hint("Pick a position within the room size.")
            .with_context("room", room.label())
            .with_context("requested_position", json!({ "x": target.x, "y": target.y }))
            .with_context("bounds", json!({ "extend_x": room.extend_x(), "extend_y": room.extend_y() })));
        }

        if let Some(entity) = self.entity_mut(agent) {
            entity.set_position(Some(target));
        }
        Ok(format!("moved to {}", target))
    }

    /// Walk to an object, or to the outermost container holding it.
    pub fn move_to_object(&mut self, agent: EntityId, target: EntityId) -> InteractionResult {
        let carrier = self.entity(agent).ok_or_else(|| unknown_entity(agent))?;
        let entity = self.entity(target).ok_or_else(|| unknown_entity(target))?;
        let label = entity.label().to_string();

        if carrier.agent_state().is_some_and(|state| state.carries(target)) {
            return Err(ActionError::soft(format!("You are already carrying {}.", label))
                .with_hint("Move to a different object or drop it first.")
                .with_context("target", label.as_str()));
        }
        let (room, _) = self.locate_actor(agent)?;

        let destination = if entity.is_connector() {
            entity
                .connector_sides()
                .and_then(|sides| sides.position_in(room))
        } else if self.room_of(target) == Some(room) {
            self.entity(self.outermost(target)).and_then(Entity::position)
        } else {
            None
        };
        let destination = destination.ok_or_else(|| {
            ActionError::hard(format!("You cannot reach {} from here.", label))
                .with_console(format!(
                    "'{}' has no reachable position in '{}'.",
                    label,
                    self.room_label(room)
                ))
                .with_hint("Only move to objects in your current room.")
                .with_context("target", label.as_str())
        })?;

        if let Some(entity) = self.entity_mut(agent) {
            entity.set_position(Some(destination));
        }
        Ok(format!("moved to {}", label))
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Carried items as `{name, id}` pairs, in pickup order.
    pub fn inventory(&self, agent: EntityId) -> Result<Vec<Value>, ActionError> {
        let state = self.require_agent(agent)?;
        Ok(state
            .inventory()
            .iter()
            .filter_map(|id| self.entity(*id))
            .map(|item| json!({ "name": item.name(), "id": item.label() }))
            .collect())
    }

    fn require_agent(&self, agent: EntityId) -> Result<&AgentState, ActionError> {
        let entity = self.entity(agent).ok_or_else(|| unknown_entity(agent))?;
        entity.agent_state().ok_or_else(|| {
            ActionError::hard(format!("{} cannot carry anything.", entity.label()))
                .with_context("actor", entity.label())
        })
    }

    /// Label of `item` if `agent` carries it.
    fn require_carried(&self, agent: EntityId, item: EntityId) -> Result<String, ActionError> {
        let state = self.require_agent(agent)?;
        let entity = self.entity(item).ok_or_else(|| unknown_entity(item))?;
        if state.carries(item) {
            return Ok(entity.label().to_string());
        }

        let carried: Vec<String> = state.inventory().iter().map(|id| self.label(*id)).collect();
        Err(ActionError::hard(format!("You are not carrying {}.", entity.label()))
            .with_console(format!(
                "Request for '{}' failed; inventory contains: {}",
                entity.label(),
                if carried.is_empty() {
                    "nothing".to_string()
                } else {
                    carried.join(", ")
                }
            ))
            .with_hint("Only use items listed in your inventory.")
            .with_context("item", entity.label())
            .with_context("inventory", carried))
    }

    fn reachable_container(
        &self,
        room: RoomId,
        position: Position,
        container: EntityId,
    ) -> Result<&Entity, ActionError> {
        let holder = self.entity(container).ok_or_else(|| unknown_entity(container))?;
        if !holder.is_container() {
            return Err(ActionError::hard(format!("{} is not a container.", holder.label()))
                .with_hint("Choose an object that can hold other objects.")
                .with_context("container", holder.label()));
        }
        if self.room_of(container) != Some(room) {
            return Err(not_in_room(holder.label(), "container")
                .with_context("container", holder.label()));
        }
        self.check_reach(position, container)?;
        Ok(holder)
    }

    fn carry(&mut self, agent: EntityId, item: EntityId) {
        if let Some(entity) = self.entity_mut(item) {
            entity.set_position(None);
            entity.set_collectible(false);
            entity.set_placement(Placement::Carried(agent));
        }
        if let Some(inventory) = self.entity_mut(agent).and_then(Entity::inventory_mut) {
            inventory.push(item);
        }
    }
}

fn not_collectible(label: &str) -> ActionError {
    ActionError::soft(format!("{} cannot be picked up.", label))
        .with_console(format!("'{}' is not collectible.", label))
        .with_hint("Only collectible objects can be taken.")
        .with_context("item", label)
}

fn closed_container(label: &str) -> ActionError {
    ActionError::soft(format!("{} is closed.", label))
        .with_console(format!("Container '{}' must be opened first.", label))
        .with_hint("Open it first.")
        .with_context("container", label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{blueprints, Room};

    struct Kitchen {
        world: World,
        room: RoomId,
        agent: EntityId,
        potato: EntityId,
        table: EntityId,
        chest: EntityId,
    }

    fn kitchen() -> Kitchen {
        let mut world = World::default();
        let room = world.add_room(Room::new("kitchen", 4.0, 4.0)).unwrap();
        let agent = world.add_entity(Entity::agent("cook").at(1.0, 1.0)).unwrap();
        let potato = world.add_entity(Entity::item("potato").at(1.5, 1.0)).unwrap();
        let table = world.add_entity(blueprints::table().at(2.0, 1.0)).unwrap();
        let chest = world.add_entity(blueprints::chest().at(1.0, 2.0)).unwrap();
        for id in [agent, potato, table, chest] {
            world.enter(id, room).unwrap();
        }
        Kitchen {
            world,
            room,
            agent,
            potato,
            table,
            chest,
        }
    }

    #[test]
    fn take_and_drop_round_trip() {
        let mut k = kitchen();
        assert_eq!(k.world.take(k.agent, k.potato).unwrap(), "took potato_3");

        let potato = k.world.entity(k.potato).unwrap();
        assert_eq!(potato.placement(), Placement::Carried(k.agent));
        assert_eq!(potato.position(), None);
        assert!(!k.world.room(k.room).unwrap().entities().contains(&k.potato));
        assert_eq!(
            k.world.inventory(k.agent).unwrap(),
            vec![json!({ "name": "potato", "id": "potato_3" })]
        );

        k.world.move_to_position(k.agent, Position::new(3.0, 3.0)).unwrap();
        k.world.drop(k.agent, k.potato).unwrap();
        let potato = k.world.entity(k.potato).unwrap();
        assert_eq!(potato.room(), Some(k.room));
        assert_eq!(potato.position(), Some(Position::new(3.0, 3.0)));
        assert!(potato.is_collectible());
        assert!(k.world.inventory(k.agent).unwrap().is_empty());
    }

    #[test]
    fn furniture_cannot_be_taken() {
        let mut k = kitchen();
        let err = k.world.take(k.agent, k.table).unwrap_err();
        assert!(err.is_soft());
        assert!(k.world.room(k.room).unwrap().entities().contains(&k.table));
    }

    #[test]
    fn take_out_of_reach_is_soft() {
        let mut k = kitchen();
        k.world.move_to_position(k.agent, Position::new(4.0, 4.0)).unwrap();
        let err = k.world.take(k.agent, k.potato).unwrap_err();
        assert!(err.is_soft());
        assert_eq!(err.feedback().context_value("target"), Some(&json!("potato_3")));
    }

    #[test]
    fn drop_of_uncarried_item_is_hard() {
        let mut k = kitchen();
        let err = k.world.drop(k.agent, k.potato).unwrap_err();
        assert!(err.is_hard());
        assert_eq!(err.feedback().context_value("inventory"), Some(&json!([])));
    }

    #[test]
    fn containers_round_trip_through_inventory() {
        let mut k = kitchen();
        k.world.take(k.agent, k.potato).unwrap();
        k.world.drop_into(k.agent, k.potato, k.table).unwrap();

        assert!(k.world.entity(k.table).unwrap().children().contains(&k.potato));
        assert_eq!(k.world.room_of(k.potato), Some(k.room));

        assert_eq!(
            k.world.take_from(k.agent, k.potato, k.table).unwrap(),
            "took potato_3 from table_4"
        );
        assert!(k.world.entity(k.table).unwrap().children().is_empty());
        assert!(k.world.entity(k.agent).unwrap().agent_state().unwrap().carries(k.potato));
    }

    #[test]
    fn closed_chest_blocks_both_directions() {
        let mut k = kitchen();
        k.world.take(k.agent, k.potato).unwrap();
        let err = k.world.drop_into(k.agent, k.potato, k.chest).unwrap_err();
        assert!(err.is_soft());
        assert!(k.world.entity(k.agent).unwrap().agent_state().unwrap().carries(k.potato));
    }

    #[test]
    fn taking_from_the_wrong_container_is_hard() {
        let mut k = kitchen();
        let err = k.world.take_from(k.agent, k.potato, k.table).unwrap_err();
        assert!(err.is_hard());
        let err = k.world.take_from(k.agent, k.table, k.potato).unwrap_err();
        assert!(err.is_hard());
    }

    #[test]
    fn move_outside_room_is_soft_with_bounds() {
        let mut k = kitchen();
        let err = k
            .world
            .move_to_position(k.agent, Position::new(5.0, 1.0))
            .unwrap_err();
        assert!(err.is_soft());
        assert_eq!(
            err.feedback().context_value("bounds"),
            Some(&json!({ "extend_x": 4.0, "extend_y": 4.0 }))
        );
        assert_eq!(
            k.world.entity(k.agent).unwrap().position(),
            Some(Position::new(1.0, 1.0))
        );
    }

    #[test]
    fn move_to_nested_object_uses_outer_container() {
        let mut k = kitchen();
        let spoon = k.world.add_entity(Entity::item("spoon")).unwrap();
        k.world.add_child(k.table, spoon).unwrap();

        k.world.move_to_object(k.agent, spoon).unwrap();
        assert_eq!(
            k.world.entity(k.agent).unwrap().position(),
            Some(Position::new(2.0, 1.0))
        );
    }

    #[test]
    fn move_to_carried_or_foreign_object_fails() {
        let mut k = kitchen();
        k.world.take(k.agent, k.potato).unwrap();
        assert!(k.world.move_to_object(k.agent, k.potato).unwrap_err().is_soft());

        let elsewhere = k.world.add_room(Room::chamber()).unwrap();
        let stool = k.world.add_entity(Entity::item("stool").at(0.5, 0.5)).unwrap();
        k.world.enter(stool, elsewhere).unwrap();
        assert!(k.world.move_to_object(k.agent, stool).unwrap_err().is_hard());
    }

    #[test]
    fn detached_agent_cannot_move() {
        let mut world = World::default();
        let agent = world.add_entity(Entity::agent("lost").at(1.0, 1.0)).unwrap();
        assert!(world
            .move_to_position(agent, Position::new(0.0, 0.0))
            .unwrap_err()
            .is_hard());
    }
}
