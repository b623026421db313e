//! Entities and rooms of the spatial model

pub mod blueprints;
mod entity;
mod room;

pub use entity::{AgentState, ConnectorSides, Entity, EntityKind, Placement};
pub use room::Room;
