//! The potato levels: fetch a potato from the side room and put it on the
//! table.
//!
//! Every difficulty uses the same floor plan. A 4x4 main room with the agent
//! in one corner, a 1x3 chamber behind a door in the opposite corner. What
//! changes is where the potato hides and how much furniture stands between
//! the agent and it.

use std::fmt;
use std::str::FromStr;

use roomsense_domain::{
    blueprints, DomainError, Entity, EntityId, Lockable, Position, Room, RoomId, World,
};
use serde::{Deserialize, Serialize};

const VAGUE_INSTRUCTION: &str = "Place a potato on the table.";
const DETAILED_INSTRUCTION: &str =
    "Find the potato in the other room, take it and place it on the table.";
const HARD_VAGUE_INSTRUCTION: &str = "Find the potato and place it on the table.";
const HARD_DETAILED_INSTRUCTION: &str = "Retrieve the potato locked in the chest in the other room. \
     Use the key on the table to unlock it, take the potato, and place it on the table.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Potato in an open chest, nothing locked
    #[default]
    Easy,
    /// Potato in a locked chest, key lying in the main room
    Medium,
    /// Like medium, with descriptive furniture and the key on the table
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(DomainError::parse(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// A built level: who acts, what they are told, and what counts as a win
#[derive(Debug, Clone, PartialEq)]
pub struct PotatoLevel {
    pub agent: EntityId,
    pub instruction: String,
    pub potato: EntityId,
    pub table: EntityId,
}

impl PotatoLevel {
    /// The potato lies directly on the table.
    pub fn is_success(&self, world: &World) -> bool {
        world
            .entity(self.table)
            .is_some_and(|table| table.children().contains(&self.potato))
    }
}

/// Build the potato level into an empty `world`.
pub fn build_potato(
    world: &mut World,
    difficulty: Difficulty,
    detailed_instruction: bool,
) -> Result<PotatoLevel, DomainError> {
    let level = match difficulty {
        Difficulty::Easy => build_easy(world, detailed_instruction),
        Difficulty::Medium => build_medium(world, detailed_instruction),
        Difficulty::Hard => build_hard(world, detailed_instruction),
    }?;
    tracing::info!(
        level = "potato",
        %difficulty,
        agent = %world.label(level.agent),
        entities = world.entities().count(),
        "Level built"
    );
    Ok(level)
}

/// Rooms, agent and door shared by every difficulty.
struct Layout {
    main: RoomId,
    chamber: RoomId,
    agent: EntityId,
}

fn layout(world: &mut World) -> Result<Layout, DomainError> {
    let main = world.add_room(Room::new("main", 4.0, 4.0))?;
    let chamber = world.add_room(Room::chamber())?;

    let agent = world.add_entity(Entity::agent("tron"))?;
    world.place(agent, main, Position::new(0.0, 0.0))?;

    Ok(Layout {
        main,
        chamber,
        agent,
    })
}

fn connect(world: &mut World, layout: &Layout) -> Result<EntityId, DomainError> {
    world.connect_rooms(
        layout.main,
        Position::new(4.0, 4.0),
        layout.chamber,
        Position::new(0.0, 1.0),
        None,
    )
}

fn place_new(
    world: &mut World,
    entity: Entity,
    room: RoomId,
    x: f64,
    y: f64,
) -> Result<EntityId, DomainError> {
    let id = world.add_entity(entity)?;
    world.place(id, room, Position::new(x, y))?;
    Ok(id)
}

fn put_new(world: &mut World, entity: Entity, container: EntityId) -> Result<EntityId, DomainError> {
    let id = world.add_entity(entity)?;
    world.add_child(container, id)?;
    Ok(id)
}

fn instruction(detailed: bool) -> String {
    if detailed {
        DETAILED_INSTRUCTION.to_string()
    } else {
        VAGUE_INSTRUCTION.to_string()
    }
}

fn build_easy(world: &mut World, detailed: bool) -> Result<PotatoLevel, DomainError> {
    let layout = layout(world)?;

    place_new(world, Entity::item("key"), layout.main, 3.0, 1.0)?;
    let table = place_new(world, blueprints::table(), layout.main, 0.0, 3.0)?;
    connect(world, &layout)?;

    let shelf = place_new(world, Entity::container("shelf"), layout.chamber, 0.0, 0.0)?;
    let chest = put_new(world, Entity::container("chest"), shelf)?;
    let potato = put_new(world, Entity::item("potato"), chest)?;

    let other = place_new(world, Entity::container("box"), layout.chamber, 0.0, 2.0)?;
    put_new(world, Entity::item("diamond"), other)?;

    Ok(PotatoLevel {
        agent: layout.agent,
        instruction: instruction(detailed),
        potato,
        table,
    })
}

fn build_medium(world: &mut World, detailed: bool) -> Result<PotatoLevel, DomainError> {
    let layout = layout(world)?;

    // Main room
    let table = place_new(world, blueprints::table(), layout.main, 0.0, 4.0)?;
    let decoy = place_new(world, Entity::container("box"), layout.main, 1.0, 1.0)?;
    put_new(world, Entity::item("diamond"), decoy)?;
    let key = place_new(world, Entity::item("key"), layout.main, 3.0, 1.0)?;
    connect(world, &layout)?;

    // Chamber
    let decoy = place_new(world, Entity::container("box"), layout.chamber, 0.0, 0.0)?;
    put_new(world, Entity::item("diamond"), decoy)?;

    let shelf = place_new(world, Entity::container("shelf"), layout.chamber, 0.0, 2.0)?;
    let chest = put_new(
        world,
        blueprints::chest().with_capability(Lockable::new(true)),
        shelf,
    )?;
    world.allow_key(chest, key)?;
    let potato = put_new(world, Entity::item("potato"), chest)?;

    Ok(PotatoLevel {
        agent: layout.agent,
        instruction: instruction(detailed),
        potato,
        table,
    })
}

fn build_hard(world: &mut World, detailed: bool) -> Result<PotatoLevel, DomainError> {
    let layout = layout(world)?;

    // Main room
    let table = place_new(world, blueprints::wooden_table(), layout.main, 0.0, 4.0)?;
    let key = put_new(world, Entity::item("key"), table)?;
    let decoy = place_new(world, blueprints::wooden_cabinet(), layout.main, 1.0, 1.0)?;
    put_new(world, Entity::item("diamond"), decoy)?;
    connect(world, &layout)?;

    // Chamber
    let decoy = place_new(world, blueprints::paper_box(), layout.chamber, 0.0, 0.0)?;
    put_new(world, Entity::item("diamond"), decoy)?;

    let shelf = place_new(world, blueprints::wooden_shelf(), layout.chamber, 0.0, 2.0)?;
    let chest = put_new(
        world,
        blueprints::chest().with_capability(Lockable::new(true)),
        shelf,
    )?;
    world.allow_key(chest, key)?;
    let potato = put_new(world, Entity::item("potato"), chest)?;

    let instruction = if detailed {
        HARD_DETAILED_INSTRUCTION
    } else {
        HARD_VAGUE_INSTRUCTION
    };
    Ok(PotatoLevel {
        agent: layout.agent,
        instruction: instruction.to_string(),
        potato,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_level_layout() {
        let mut world = World::default();
        let level = build_potato(&mut world, Difficulty::Easy, true).unwrap();

        assert_eq!(level.instruction, DETAILED_INSTRUCTION);
        assert_eq!(world.label(level.agent), "tron_3");
        assert_eq!(world.find_by_readable_id("door_6"), world.find_by_name("door"));

        let main = world.find_room_by_readable_id("main_1").unwrap();
        let chamber = world.find_room_by_readable_id("chamber_2").unwrap();
        assert_eq!(world.room_of(level.agent), Some(main));
        assert_eq!(world.room_of(level.potato), Some(chamber));
        assert!(!level.is_success(&world));
    }

    #[test]
    fn medium_chest_is_locked_with_the_key() {
        let mut world = World::default();
        let level = build_potato(&mut world, Difficulty::Medium, false).unwrap();
        assert_eq!(level.instruction, VAGUE_INSTRUCTION);

        let chest = world.entity(level.potato).and_then(|p| p.parent()).unwrap();
        let chest = world.entity(chest).unwrap();
        assert_eq!(chest.is_locked(), Some(true));
        assert_eq!(chest.is_open(), Some(false));

        let key = world.find_by_name("key").unwrap();
        assert!(chest.lockable().unwrap().allowed_keys().contains(&key));
    }

    #[test]
    fn hard_key_lies_on_the_table() {
        let mut world = World::default();
        let level = build_potato(&mut world, Difficulty::Hard, true).unwrap();
        assert!(level.instruction.starts_with("Retrieve the potato"));

        let key = world.find_by_name("key").unwrap();
        let table = world.entity(level.table).unwrap();
        assert!(table.children().contains(&key));
        assert_eq!(table.material(), Some("oak wood"));
    }

    #[test]
    fn rebuild_after_clear_reuses_ids() {
        let mut world = World::default();
        let first = build_potato(&mut world, Difficulty::Medium, true).unwrap();
        world.clear();
        let second = build_potato(&mut world, Difficulty::Medium, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn difficulty_parses() {
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("brutal".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }
}
