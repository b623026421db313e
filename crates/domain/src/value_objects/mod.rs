//! Value objects: small immutable types compared by value

mod action;
mod depth;
mod position;
mod settings;

pub use action::{ActionTry, ActionType};
pub use depth::Depth;
pub use position::Position;
pub use settings::{env_or, PerceptionMode, SimulationSettings};
