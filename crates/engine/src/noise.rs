//! Noise sources for quantity obfuscation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roomsense_domain::NoiseSource;

/// Seeded noise - reproducible per episode seed.
pub struct SeededNoise(StdRng);

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl NoiseSource for SeededNoise {
    fn gen_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.0.gen_range(min..=max)
    }
}

/// Fixed noise for testing, clamped into the requested range.
#[cfg(test)]
pub struct FixedNoise(pub i64);

#[cfg(test)]
impl NoiseSource for FixedNoise {
    fn gen_range(&mut self, min: i64, max: i64) -> i64 {
        self.0.clamp(min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededNoise::new(12345);
        let mut b = SeededNoise::new(12345);
        let first: Vec<i64> = (0..16).map(|_| a.gen_range(-3, 3)).collect();
        let second: Vec<i64> = (0..16).map(|_| b.gen_range(-3, 3)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| (-3..=3).contains(v)));
    }

    #[test]
    fn empty_range_returns_min() {
        let mut noise = SeededNoise::new(1);
        assert_eq!(noise.gen_range(4, 4), 4);
        assert_eq!(noise.gen_range(5, 2), 5);
    }

    #[test]
    fn fixed_noise_is_clamped() {
        let mut noise = FixedNoise(10);
        assert_eq!(noise.gen_range(-1, 1), 1);
        assert_eq!(FixedNoise(-10).gen_range(-2, 2), -2);
        assert_eq!(FixedNoise(0).gen_range(-2, 2), 0);
    }
}
