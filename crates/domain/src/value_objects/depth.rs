//! Disclosure tiers for perception
//!
//! A [`Depth`] says how much detail an observation is entitled to. Tiers are
//! totally ordered; `Reveal` and `Omniscient` sit above `Full` and are used
//! for debugging and scripted reveals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::noise::NoiseSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Depth {
    None,
    Minimal,
    Reduced,
    Basic,
    Normal,
    Extended,
    Rich,
    Full,
    /// Drills into every leaf but can still be blocked by zero visibility
    Reveal,
    /// Drills into every leaf and can never be blocked
    Omniscient,
}

const ALL_DEPTHS: [Depth; 10] = [
    Depth::None,
    Depth::Minimal,
    Depth::Reduced,
    Depth::Basic,
    Depth::Normal,
    Depth::Extended,
    Depth::Rich,
    Depth::Full,
    Depth::Reveal,
    Depth::Omniscient,
];

impl Depth {
    /// Numeric tier, `None = -1` up to `Omniscient = 8`.
    pub fn value(&self) -> i8 {
        match self {
            Self::None => -1,
            Self::Minimal => 0,
            Self::Reduced => 1,
            Self::Basic => 2,
            Self::Normal => 3,
            Self::Extended => 4,
            Self::Rich => 5,
            Self::Full => 6,
            Self::Reveal => 7,
            Self::Omniscient => 8,
        }
    }

    pub fn from_value(value: i8) -> Option<Self> {
        ALL_DEPTHS.iter().copied().find(|d| d.value() == value)
    }

    pub fn all() -> &'static [Depth] {
        &ALL_DEPTHS
    }

    /// Reduce this depth by a visibility factor in `0.0..=1.0`.
    ///
    /// Zero visibility collapses to `Minimal` (or stays `None`), full
    /// visibility keeps the tier. In between the tier drops linearly across
    /// the `Minimal..=Full` span, rounded down and never below `Minimal`, so
    /// a partial view lifts `None` to `Minimal`. `Omniscient` is never
    /// reduced and `Reveal` survives any non-zero visibility.
    pub fn reduced(self, visibility: f64) -> Depth {
        if self == Self::Omniscient {
            return self;
        }
        if visibility <= 0.0 {
            return if self == Self::None {
                Self::None
            } else {
                Self::Minimal
            };
        }
        if self == Self::Reveal || visibility >= 1.0 {
            return self;
        }

        let span = f64::from(Self::Full.value() - Self::Minimal.value());
        let steps = span * (1.0 - visibility);
        let lowered = (f64::from(self.value()) - steps).max(f64::from(Self::Minimal.value()));
        // Truncation floors here since `lowered` is never negative
        Self::from_value(lowered as i8).unwrap_or(Self::Minimal)
    }

    /// Step down `steps` tiers, never below `Minimal`.
    ///
    /// Used when descending into nested containers. `None` and `Omniscient`
    /// are unaffected.
    pub fn lowered(self, steps: u8) -> Depth {
        match self {
            Self::None | Self::Omniscient => self,
            _ => {
                let value = (self.value() - steps.min(8) as i8).max(Self::Minimal.value());
                Self::from_value(value).unwrap_or(Self::Minimal)
            }
        }
    }

    /// Render a count with tier-dependent vagueness.
    ///
    /// Noise is drawn only by tiers that actually render a noisy number.
    pub fn obfuscate_number(self, n: u64, noise: &mut dyn NoiseSource) -> String {
        if self == Self::None {
            return "unknown".to_string();
        }
        if n == 0 {
            return "nothing".to_string();
        }

        match self {
            Self::Minimal => "some".to_string(),
            Self::Reduced => {
                if n < 5 {
                    "a few".to_string()
                } else {
                    "several".to_string()
                }
            }
            Self::Basic if n > 5 => {
                let rough = round_to_ten(n) as i64;
                let delta = (rough / 20).max(1);
                let noisy = (rough + noise.gen_range(-delta, delta)).max(0);
                format!("around {}", noisy.max(1))
            }
            Self::Normal if n > 10 => {
                let n = n as i64;
                let delta = (n / 20).max(1);
                let noisy = n + noise.gen_range(-delta, delta);
                format!("about {}", noisy.max(1))
            }
            Self::Extended if n > 10 => {
                let n = n as i64;
                let tolerance = (n / 10).max(1);
                let low = (n - tolerance).max(0);
                let high = n + tolerance;
                format!("between {} and {}", low.max(1), high.max(low + 2))
            }
            Self::Rich if n > 10 => format!("~{}", n),
            _ => n.to_string(),
        }
    }
}

/// Round to the nearest multiple of ten, ties to the even multiple.
fn round_to_ten(n: u64) -> u64 {
    let tens = n / 10;
    let rest = n % 10;
    let rounded = if rest > 5 || (rest == 5 && tens % 2 == 1) {
        tens + 1
    } else {
        tens
    };
    rounded * 10
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Minimal => "MINIMAL",
            Self::Reduced => "REDUCED",
            Self::Basic => "BASIC",
            Self::Normal => "NORMAL",
            Self::Extended => "EXTENDED",
            Self::Rich => "RICH",
            Self::Full => "FULL",
            Self::Reveal => "REVEAL",
            Self::Omniscient => "OMNISCIENT",
        };
        f.write_str(name)
    }
}

impl FromStr for Depth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ALL_DEPTHS
            .iter()
            .copied()
            .find(|d| d.to_string() == wanted)
            .ok_or_else(|| DomainError::parse(format!("Unknown depth: {}", s)))
    }
}
