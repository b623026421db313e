//! Roomsense Engine - episode orchestration around the perception world.
//!
//! The domain crate knows rooms, entities and what an observer can perceive.
//! This crate turns that into an episode an agent can play: readable-id
//! commands, recorded results, observation payloads and demo levels.

pub mod commands;
pub mod config;
pub mod levels;
pub mod noise;
pub mod presentation;
pub mod session;

#[cfg(test)]
mod e2e_tests;

pub use commands::{AgentCommand, Operator, FLOOR};
pub use config::EngineConfig;
pub use levels::{build_potato, Difficulty, PotatoLevel};
pub use noise::SeededNoise;
pub use presentation::{PositionFormat, PresentationError};
pub use session::{EpisodeStats, NoiseFactory, Session};
