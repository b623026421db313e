//! Simulation settings value object
//!
//! Tunables for one episode: how perception is gated, how far agents reach,
//! and which interactions a default observation performs. Serializable so
//! a level file or an orchestrator can ship them alongside a world.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::perception::Interaction;
use crate::value_objects::Depth;

/// How a datum decides whether it is disclosed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionMode {
    /// Full sensory model: channels, falloff, observer, thresholds
    #[default]
    Sense,
    /// Everything within `perception_distance` meeting the depth gate
    Distance,
    /// Everything, unconditionally
    All,
}

impl fmt::Display for PerceptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sense => write!(f, "sense"),
            Self::Distance => write!(f, "distance"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for PerceptionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sense" => Ok(Self::Sense),
            "distance" => Ok(Self::Distance),
            "all" => Ok(Self::All),
            other => Err(DomainError::parse(format!(
                "Unknown perception mode: {}",
                other
            ))),
        }
    }
}

/// All configurable simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default)]
    pub perception_mode: PerceptionMode,

    /// Radius in meters used by `PerceptionMode::Distance`
    #[serde(default = "default_perception_distance")]
    pub perception_distance: f64,

    /// Maximum reach in meters for state-changing interactions
    #[serde(default = "default_interaction_distance")]
    pub interaction_distance: f64,

    /// Tiers lost per level of container nesting
    #[serde(default = "default_depth_factor")]
    pub depth_factor: u8,

    /// Depth used by a default observation
    #[serde(default = "default_observe_depth")]
    pub observe_depth: Depth,

    /// Interactions performed by a default observation
    #[serde(default = "default_observe_interactions")]
    pub observe_interactions: Vec<Interaction>,

    /// Seed for the episode's obfuscation noise
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_perception_distance() -> f64 {
    4.0
}

fn default_interaction_distance() -> f64 {
    1.5
}

fn default_depth_factor() -> u8 {
    1
}

fn default_observe_depth() -> Depth {
    Depth::Full
}

fn default_observe_interactions() -> Vec<Interaction> {
    vec![Interaction::Inspect, Interaction::Feel]
}

fn default_seed() -> u64 {
    12345
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            perception_mode: PerceptionMode::default(),
            perception_distance: default_perception_distance(),
            interaction_distance: default_interaction_distance(),
            depth_factor: default_depth_factor(),
            observe_depth: default_observe_depth(),
            observe_interactions: default_observe_interactions(),
            seed: default_seed(),
        }
    }
}

impl SimulationSettings {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            perception_mode: env_or("ROOMSENSE_PERCEPTION_MODE", defaults.perception_mode),
            perception_distance: env_or(
                "ROOMSENSE_PERCEPTION_DISTANCE",
                defaults.perception_distance,
            ),
            interaction_distance: env_or(
                "ROOMSENSE_INTERACTION_DISTANCE",
                defaults.interaction_distance,
            ),
            depth_factor: env_or("ROOMSENSE_DEPTH_FACTOR", defaults.depth_factor),
            observe_depth: env_or("ROOMSENSE_OBSERVE_DEPTH", defaults.observe_depth),
            observe_interactions: env_list_or(
                "ROOMSENSE_OBSERVE_INTERACTIONS",
                defaults.observe_interactions,
            ),
            seed: env_or("ROOMSENSE_SEED", defaults.seed),
        }
    }

    pub fn with_perception_mode(mut self, mode: PerceptionMode) -> Self {
        self.perception_mode = mode;
        self
    }

    pub fn with_interaction_distance(mut self, meters: f64) -> Self {
        self.interaction_distance = meters;
        self
    }

    pub fn with_observe(mut self, depth: Depth, interactions: Vec<Interaction>) -> Self {
        self.observe_depth = depth;
        self.observe_interactions = interactions;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Parse `key` from the environment, falling back to `default` when it is
/// unset or unparsable.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Comma-separated list; any unparsable entry discards the whole value.
fn env_list_or<T: FromStr>(key: &str, default: Vec<T>) -> Vec<T> {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_list(&v))
        .unwrap_or(default)
}

fn parse_list<T: FromStr>(raw: &str) -> Option<Vec<T>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_episode_constants() {
        let settings = SimulationSettings::default();
        assert_eq!(settings.perception_mode, PerceptionMode::Sense);
        assert_eq!(settings.perception_distance, 4.0);
        assert_eq!(settings.interaction_distance, 1.5);
        assert_eq!(settings.depth_factor, 1);
        assert_eq!(settings.observe_depth, Depth::Full);
        assert_eq!(
            settings.observe_interactions,
            vec![Interaction::Inspect, Interaction::Feel]
        );
        assert_eq!(settings.seed, 12345);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let settings: SimulationSettings =
            serde_json::from_str(r#"{"perception_mode":"distance","seed":7}"#).unwrap();
        assert_eq!(settings.perception_mode, PerceptionMode::Distance);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.interaction_distance, 1.5);
    }

    #[test]
    fn parse_list_rejects_unknown_entries() {
        let parsed: Option<Vec<Interaction>> = parse_list("look, listen");
        assert_eq!(parsed, Some(vec![Interaction::Look, Interaction::Listen]));
        let parsed: Option<Vec<Interaction>> = parse_list("look,teleport");
        assert_eq!(parsed, None);
    }

    #[test]
    fn perception_mode_round_trips_through_text() {
        for mode in [PerceptionMode::Sense, PerceptionMode::Distance, PerceptionMode::All] {
            assert_eq!(mode.to_string().parse::<PerceptionMode>().unwrap(), mode);
        }
    }
}
