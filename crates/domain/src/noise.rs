//! Randomness port for quantity obfuscation.
//!
//! The domain never owns a random generator. Callers hand one in for every
//! operation that may render an obfuscated number, so tests can pin it.

#[cfg_attr(test, mockall::automock)]
pub trait NoiseSource {
    /// Returns a value in `min..=max`.
    fn gen_range(&mut self, min: i64, max: i64) -> i64;
}
