//! Sensory channels and the interactions that open them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensoryChannel {
    Vision,
    Hearing,
    Smell,
    Touch,
    Taste,
}

impl fmt::Display for SensoryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vision => "VISION",
            Self::Hearing => "HEARING",
            Self::Smell => "SMELL",
            Self::Touch => "TOUCH",
            Self::Taste => "TASTE",
        };
        f.write_str(name)
    }
}

/// Physical activity an observer performs while perceiving
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interaction {
    // No perception
    Open,
    Close,
    Lock,
    Unlock,

    /// Broad passive intake of the strongest stimuli
    Survey,

    Glance,
    Look,
    Inspect,
    Listen,
    Sniff,

    /// General touch: texture and temperature
    Touch,
    /// Careful palpation: seams and shapes
    Feel,
    /// Gentle knock: cavity and rattle cues
    Tap,

    Taste,
    Push,
    Pull,
    Slide,
    Lift,
    Tilt,
    Shake,
    /// Quick look through a gap or lid
    Peek,
}

/// One channel an interaction enables, with its effort weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSense {
    pub channel: SensoryChannel,
    /// 0.0 = none, 1.0 = normal
    pub effort: f64,
}

const fn sense(channel: SensoryChannel, effort: f64) -> InteractionSense {
    InteractionSense { channel, effort }
}

const VISION: InteractionSense = sense(SensoryChannel::Vision, 1.0);
const HEARING: InteractionSense = sense(SensoryChannel::Hearing, 1.0);
const SMELL: InteractionSense = sense(SensoryChannel::Smell, 1.0);
const TOUCH: InteractionSense = sense(SensoryChannel::Touch, 1.0);
const TASTE: InteractionSense = sense(SensoryChannel::Taste, 0.8);

const SURVEY_SENSES: [InteractionSense; 5] = [
    sense(SensoryChannel::Vision, 0.9),
    sense(SensoryChannel::Hearing, 0.4),
    sense(SensoryChannel::Smell, 0.2),
    sense(SensoryChannel::Touch, 0.2),
    sense(SensoryChannel::Taste, 0.1),
];

/// Cost profile of an interaction, used by planners to rank options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionMeta {
    /// 0.0 = free, 1.0 = normal
    pub cost: f64,
    /// 0.0 = none, 1.0 = high
    pub risk_exposure: f64,
    /// 0.0 = silent, 1.0 = normal
    pub noise_generated: f64,
    pub time_required_s: f64,
}

impl Default for InteractionMeta {
    fn default() -> Self {
        Self {
            cost: 1.0,
            risk_exposure: 0.01,
            noise_generated: 1.0,
            time_required_s: 1.0,
        }
    }
}

impl InteractionMeta {
    fn with(cost: f64, risk_exposure: f64, noise_generated: f64, time_required_s: f64) -> Self {
        Self {
            cost,
            risk_exposure,
            noise_generated,
            time_required_s,
        }
    }
}

const ALL_INTERACTIONS: [Interaction; 21] = [
    Interaction::Open,
    Interaction::Close,
    Interaction::Lock,
    Interaction::Unlock,
    Interaction::Survey,
    Interaction::Glance,
    Interaction::Look,
    Interaction::Inspect,
    Interaction::Listen,
    Interaction::Sniff,
    Interaction::Touch,
    Interaction::Feel,
    Interaction::Tap,
    Interaction::Taste,
    Interaction::Push,
    Interaction::Pull,
    Interaction::Slide,
    Interaction::Lift,
    Interaction::Tilt,
    Interaction::Shake,
    Interaction::Peek,
];

impl Interaction {
    pub fn all() -> &'static [Interaction] {
        &ALL_INTERACTIONS
    }

    /// Channels this interaction makes available.
    pub fn senses(&self) -> &'static [InteractionSense] {
        match self {
            Self::Open | Self::Close => &[TOUCH, VISION, HEARING],
            Self::Lock | Self::Unlock => &[],
            Self::Survey => &SURVEY_SENSES,
            Self::Glance | Self::Look | Self::Inspect | Self::Peek => &[VISION],
            Self::Listen => &[HEARING],
            Self::Sniff => &[SMELL],
            Self::Touch
            | Self::Feel
            | Self::Push
            | Self::Pull
            | Self::Slide
            | Self::Lift
            | Self::Tilt => &[TOUCH],
            Self::Tap | Self::Shake => &[TOUCH, HEARING],
            Self::Taste => &[TASTE],
        }
    }

    pub fn enables(&self, channel: SensoryChannel) -> bool {
        self.senses().iter().any(|s| s.channel == channel)
    }

    /// Effort weight for `channel`, 1.0 when the channel is not involved.
    pub fn channel_effort(&self, channel: SensoryChannel) -> f64 {
        self.senses()
            .iter()
            .find(|s| s.channel == channel)
            .map(|s| s.effort)
            .unwrap_or(1.0)
    }

    pub fn meta(&self) -> InteractionMeta {
        match self {
            Self::Survey => InteractionMeta {
                cost: 0.0,
                noise_generated: 0.1,
                ..Default::default()
            },
            Self::Glance => InteractionMeta {
                time_required_s: 0.1,
                ..Default::default()
            },
            Self::Inspect => InteractionMeta {
                time_required_s: 3.0,
                cost: 0.2,
                ..Default::default()
            },
            Self::Listen => InteractionMeta {
                time_required_s: 2.0,
                ..Default::default()
            },
            Self::Sniff => InteractionMeta {
                time_required_s: 1.5,
                ..Default::default()
            },
            Self::Feel => InteractionMeta::with(0.5, 0.2, 1.0, 2.5),
            Self::Tap => InteractionMeta {
                noise_generated: 0.4,
                ..Default::default()
            },
            Self::Push | Self::Pull => InteractionMeta {
                cost: 0.3,
                noise_generated: 0.2,
                ..Default::default()
            },
            Self::Slide => InteractionMeta::with(0.4, 0.01, 0.3, 1.5),
            Self::Lift => InteractionMeta::with(0.8, 0.01, 0.3, 2.0),
            Self::Tilt => InteractionMeta::with(0.6, 0.01, 0.3, 2.0),
            Self::Shake => InteractionMeta::with(0.8, 0.1, 0.7, 2.0),
            Self::Open => InteractionMeta::with(0.5, 0.01, 0.2, 2.0),
            Self::Close => InteractionMeta {
                cost: 0.3,
                noise_generated: 0.2,
                ..Default::default()
            },
            Self::Taste => InteractionMeta {
                time_required_s: 1.5,
                risk_exposure: 1.0,
                ..Default::default()
            },
            Self::Look | Self::Touch | Self::Peek | Self::Lock | Self::Unlock => {
                InteractionMeta::default()
            }
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format!("{:?}", self).to_ascii_uppercase())
    }
}

impl FromStr for Interaction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ALL_INTERACTIONS
            .iter()
            .copied()
            .find(|i| i.to_string() == wanted)
            .ok_or_else(|| DomainError::parse(format!("Unknown interaction: {}", s)))
    }
}
