extern crate self as roomsense_domain;

pub mod capabilities;
pub mod entities;
pub mod error;
pub mod ids;
pub mod noise;
pub mod perception;
pub mod results;
pub mod value_objects;
pub mod world;

pub use capabilities::{
    Capability, CapabilityKind, InteractionContext, Lockable, Openable, Usable, UseEffect,
};

pub use entities::{blueprints, AgentState, ConnectorSides, Entity, EntityKind, Placement, Room};

pub use error::DomainError;

// Re-export ID types
pub use ids::{EntityId, ReadableId, RoomId};

pub use noise::NoiseSource;

// Re-export perception model
pub use perception::{
    Datum, DatumOperator, DatumProbe, Interaction, InteractionMeta, ObserverPerception,
    PerceivedInfo, PerceptionEnvironment, SensoryChannel,
};

pub use results::{
    ActionError, ActionFeedback, InteractionResult, ResultBuffer, ResultKind, ResultRecord,
};

// Re-export value objects
pub use value_objects::{
    env_or, ActionTry, ActionType, Depth, PerceptionMode, Position, SimulationSettings,
};

pub use world::World;
