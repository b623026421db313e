//! Engine configuration loaded from the environment.

use roomsense_domain::{env_or, SimulationSettings};

use crate::levels::Difficulty;
use crate::presentation::PositionFormat;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub simulation: SimulationSettings,
    pub position_format: PositionFormat,
    pub difficulty: Difficulty,
    /// Build levels with material and description on every object
    pub detailed: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            position_format: PositionFormat::default(),
            difficulty: Difficulty::default(),
            detailed: true,
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            simulation: SimulationSettings::from_env(),
            position_format: env_or("ROOMSENSE_POSITION_FORMAT", defaults.position_format),
            difficulty: env_or("ROOMSENSE_LEVEL", defaults.difficulty),
            detailed: env_or("ROOMSENSE_DETAILED", defaults.detailed),
        }
    }

    pub fn with_simulation(mut self, simulation: SimulationSettings) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_position_format(mut self, format: PositionFormat) -> Self {
        self.position_format = format;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}
