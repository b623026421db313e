//! Environmental signal model
//!
//! [`PerceptionEnvironment`] describes the physical situation between an
//! observer and a target: distance, ambient light, noise and smell, and the
//! interactions being performed. Each channel turns that into a 0..1 signal
//! before any observer modifiers apply.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::channel::{Interaction, SensoryChannel};

pub const VISION_RANGE_M: f64 = 60.0;
pub const HEARING_RANGE_M: f64 = 20.0;
pub const SMELL_RANGE_M: f64 = 15.0;
pub const TOUCH_RANGE_M: f64 = 0.5;

/// Upper bound for the combined effort of several interactions on one channel
pub const MAX_COMBINED_EFFORT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalloffKind {
    #[default]
    Exp,
    Linear,
    Quad,
}

/// Parameters of a channel's distance falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelFalloff {
    /// Larger is steeper
    pub softness: f64,
    /// Source strength, e.g. brightness
    pub base: f64,
    /// Ambient interference, 1.0 = none
    pub mask: f64,
    pub max_effect: f64,
    pub offset: f64,
    pub kind: FalloffKind,
}

impl Default for ChannelFalloff {
    fn default() -> Self {
        Self {
            softness: 0.5,
            base: 1.0,
            mask: 1.0,
            max_effect: 1.0,
            offset: 0.0,
            kind: FalloffKind::Exp,
        }
    }
}

pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Generic falloff calculator shared by the distance-based channels.
pub fn channel_effective(distance_m: f64, falloff: &ChannelFalloff) -> f64 {
    let scaled = distance_m * falloff.softness;
    let shape = if distance_m <= 0.0 {
        1.0
    } else {
        match falloff.kind {
            FalloffKind::Linear => (1.0 - scaled).max(0.0),
            FalloffKind::Quad => (1.0 - scaled * scaled).max(0.0),
            FalloffKind::Exp => (-scaled).exp(),
        }
    };

    let raw = falloff.base * falloff.mask * (shape + falloff.offset);
    clamp01(raw).min(falloff.max_effect)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionEnvironment {
    /// Distance to the target in meters, >= 0
    pub distance_m: f64,
    /// 0 = dark, 1 = bright daylight
    pub light_level: f64,
    /// 0 = silent, 1 = very loud
    pub ambient_noise: f64,
    /// 0 = neutral air, 1 = strong background odor
    pub ambient_smell: f64,
    pub interactions: Vec<Interaction>,
}

impl PerceptionEnvironment {
    pub fn new(distance_m: f64) -> Self {
        Self {
            distance_m,
            light_level: 0.5,
            ambient_noise: 0.5,
            ambient_smell: 0.5,
            interactions: Vec::new(),
        }
    }

    pub fn with_ambient(mut self, light_level: f64, ambient_noise: f64, ambient_smell: f64) -> Self {
        self.light_level = light_level;
        self.ambient_noise = ambient_noise;
        self.ambient_smell = ambient_smell;
        self
    }

    pub fn with_light(mut self, light_level: f64) -> Self {
        self.light_level = light_level;
        self
    }

    pub fn with_interactions(mut self, interactions: impl IntoIterator<Item = Interaction>) -> Self {
        self.interactions = interactions.into_iter().collect();
        self
    }

    /// Copy of this environment at a different distance.
    pub fn at_distance(&self, distance_m: f64) -> Self {
        Self {
            distance_m,
            ..self.clone()
        }
    }

    /// Exponential optical falloff moderated by light.
    pub fn vision_effective(&self) -> f64 {
        if self.distance_m > VISION_RANGE_M {
            return 0.0;
        }
        channel_effective(
            self.distance_m,
            &ChannelFalloff {
                softness: 0.05,
                // Brightness above 1.0 gives no extra benefit
                base: self.light_level.min(1.0),
                ..Default::default()
            },
        )
    }

    pub fn hearing_effective(&self) -> f64 {
        if self.distance_m > HEARING_RANGE_M {
            return 0.0;
        }
        channel_effective(
            self.distance_m,
            &ChannelFalloff {
                softness: 0.6,
                mask: (1.0 - self.ambient_noise).max(0.0),
                ..Default::default()
            },
        )
    }

    pub fn smell_effective(&self) -> f64 {
        if self.distance_m > SMELL_RANGE_M {
            return 0.0;
        }
        channel_effective(
            self.distance_m,
            &ChannelFalloff {
                softness: 0.9,
                mask: (1.0 - self.ambient_smell).max(0.0),
                ..Default::default()
            },
        )
    }

    pub fn touch_effective(&self) -> f64 {
        if self.distance_m > TOUCH_RANGE_M {
            return 0.0;
        }
        channel_effective(self.distance_m, &ChannelFalloff::default())
    }

    /// Environmental 0..1 signal for `channel`, zero unless an active
    /// interaction enables it. Taste assumes direct contact.
    pub fn signal_strength(&self, channel: SensoryChannel) -> f64 {
        if !self.allows(channel) {
            return 0.0;
        }
        match channel {
            SensoryChannel::Vision => self.vision_effective(),
            SensoryChannel::Hearing => self.hearing_effective(),
            SensoryChannel::Smell => self.smell_effective(),
            SensoryChannel::Touch => self.touch_effective(),
            SensoryChannel::Taste => 1.0,
        }
    }

    pub fn active_channels(&self) -> BTreeSet<SensoryChannel> {
        self.interactions
            .iter()
            .flat_map(|i| i.senses().iter().map(|s| s.channel))
            .collect()
    }

    pub fn allows(&self, channel: SensoryChannel) -> bool {
        self.interactions.iter().any(|i| i.enables(channel))
    }

    /// Strongest effort on `channel` plus a tenth of every other one,
    /// capped at [`MAX_COMBINED_EFFORT`]. 1.0 when nothing touches it.
    pub fn combined_effort(&self, channel: SensoryChannel) -> f64 {
        let mut efforts: Vec<f64> = self
            .interactions
            .iter()
            .flat_map(|i| i.senses().iter())
            .filter(|s| s.channel == channel)
            .map(|s| s.effort)
            .collect();

        if efforts.is_empty() {
            return 1.0;
        }

        efforts.sort_by(|a, b| b.total_cmp(a));
        let combined = efforts[0] + efforts[1..].iter().map(|e| 0.1 * e).sum::<f64>();
        combined.min(MAX_COMBINED_EFFORT)
    }
}
