use serde::{Deserialize, Serialize};

use super::channel::SensoryChannel;
use super::environment::{clamp01, PerceptionEnvironment};

/// Source level of a loud alarm at 1 m
pub const LOUD_SOUND_DB: f64 = 80.0;
/// Source level of normal speech at 1 m
pub const SPEECH_DB: f64 = 60.0;
/// dB above threshold at which a sound counts as fully audible
pub const DYNAMIC_RANGE_DB: f64 = 40.0;

/// Penalty on raw audibility for understanding speech over hearing it
const SPEECH_INTELLIGIBILITY_PENALTY: f64 = 0.2;

/// Personal perception modifiers of an observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverPerception {
    /// dB SPL threshold, 20 is normal hearing
    pub hearing_sensitivity_db: f64,
    /// 1.0 = normal eyesight
    pub vision_acuity: f64,
    /// 1.0 = normal sense of smell
    pub smell_sensitivity: f64,
    /// 0..1, 1 = exhausted
    pub fatigue: f64,
    /// 0..1, 1 = fully attentive
    pub attention: f64,
}

impl Default for ObserverPerception {
    fn default() -> Self {
        Self {
            hearing_sensitivity_db: 20.0,
            vision_acuity: 1.0,
            smell_sensitivity: 1.0,
            fatigue: 0.0,
            attention: 1.0,
        }
    }
}

impl ObserverPerception {
    pub fn with_fatigue(mut self, fatigue: f64) -> Self {
        self.fatigue = fatigue;
        self
    }

    pub fn with_attention(mut self, attention: f64) -> Self {
        self.attention = attention;
        self
    }

    pub fn with_vision_acuity(mut self, acuity: f64) -> Self {
        self.vision_acuity = acuity;
        self
    }

    fn rested(&self) -> f64 {
        1.0 - self.fatigue
    }

    /// Audibility of a source emitting `source_level_db` at 1 m.
    pub fn hearing_effective(&self, env: &PerceptionEnvironment, source_level_db: f64) -> f64 {
        let env_signal = env.hearing_effective();

        let level = if env.distance_m <= 0.0 {
            source_level_db
        } else {
            source_level_db - 20.0 * env.distance_m.log10()
        };
        let margin = (level - self.hearing_sensitivity_db).max(0.0);
        let personal_factor = (margin / DYNAMIC_RANGE_DB).min(1.0);
        let personal_mask = (self.attention * self.rested()).max(0.0);

        env_signal * personal_factor * personal_mask
    }

    pub fn hear_sound_effective(&self, env: &PerceptionEnvironment) -> f64 {
        self.hearing_effective(env, LOUD_SOUND_DB)
    }

    pub fn understand_speech_effective(&self, env: &PerceptionEnvironment) -> f64 {
        (self.hearing_effective(env, SPEECH_DB) - SPEECH_INTELLIGIBILITY_PENALTY).max(0.0)
    }

    pub fn vision_effective(&self, env: &PerceptionEnvironment, intensity: f64) -> f64 {
        let base = env.vision_effective() * intensity;
        clamp01(base * (self.vision_acuity * self.rested()).max(0.0))
    }

    pub fn smell_effective(&self, env: &PerceptionEnvironment, intensity: f64) -> f64 {
        let base = env.smell_effective() * intensity;
        clamp01(base * (self.smell_sensitivity * self.rested()).max(0.0))
    }

    pub fn touch_effective(&self, env: &PerceptionEnvironment, intensity: f64) -> f64 {
        let base = env.touch_effective() * intensity;
        clamp01(base * self.rested().max(0.0))
    }

    /// Score for one channel at the given required intensity.
    ///
    /// For hearing the intensity is the source level in dB; taste passes the
    /// intensity through unchanged.
    pub fn channel_score(
        &self,
        channel: SensoryChannel,
        env: &PerceptionEnvironment,
        intensity: f64,
    ) -> f64 {
        match channel {
            SensoryChannel::Vision => self.vision_effective(env, intensity),
            SensoryChannel::Hearing => self.hearing_effective(env, intensity),
            SensoryChannel::Smell => self.smell_effective(env, intensity),
            SensoryChannel::Touch => self.touch_effective(env, intensity),
            SensoryChannel::Taste => intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn vision_scales_with_fatigue_and_acuity() {
        let env = PerceptionEnvironment::new(0.0).with_light(1.0);
        let rested = ObserverPerception::default();
        let tired = ObserverPerception::default().with_fatigue(0.5);
        let sharp = ObserverPerception::default().with_vision_acuity(2.0);

        assert_eq!(rested.vision_effective(&env, 0.8), 0.8);
        assert!(approx(tired.vision_effective(&env, 0.8), 0.4));
        assert_eq!(sharp.vision_effective(&env, 0.8), 1.0);
    }

    #[test]
    fn attention_does_not_affect_vision() {
        let env = PerceptionEnvironment::new(2.0).with_light(1.0);
        let distracted = ObserverPerception::default().with_attention(0.1);
        assert_eq!(
            distracted.vision_effective(&env, 1.0),
            ObserverPerception::default().vision_effective(&env, 1.0)
        );
    }

    #[test]
    fn loud_sound_at_one_meter_is_fully_audible_in_silence() {
        // 80 dB - 0 dB spreading = 80, margin 60 over a 40 dB range saturates
        let env = PerceptionEnvironment::new(1.0).with_ambient(0.5, 0.0, 0.5);
        let observer = ObserverPerception::default();
        assert!(approx(observer.hear_sound_effective(&env), (-0.6f64).exp()));
    }

    #[test]
    fn hearing_margin_is_partial_for_quiet_sources() {
        // 40 dB at 1 m: margin 20 / 40 = 0.5
        let env = PerceptionEnvironment::new(1.0).with_ambient(0.5, 0.0, 0.5);
        let observer = ObserverPerception::default();
        assert!(approx(
            observer.hearing_effective(&env, 40.0),
            0.5 * (-0.6f64).exp()
        ));
        assert_eq!(observer.hearing_effective(&env, 10.0), 0.0);
    }

    #[test]
    fn hearing_uses_source_level_at_zero_distance() {
        let env = PerceptionEnvironment::new(0.0).with_ambient(0.5, 0.0, 0.5);
        let observer = ObserverPerception::default().with_attention(0.5);
        assert!(approx(observer.hear_sound_effective(&env), 0.5));
    }

    #[test]
    fn speech_is_harder_than_sound() {
        let env = PerceptionEnvironment::new(0.0).with_ambient(0.5, 0.0, 0.5);
        let observer = ObserverPerception::default();
        assert!(approx(observer.understand_speech_effective(&env), 0.8));

        let noisy = PerceptionEnvironment::new(0.0).with_ambient(0.5, 0.9, 0.5);
        assert_eq!(observer.understand_speech_effective(&noisy), 0.0);
    }

    #[test]
    fn taste_passes_intensity_through() {
        let env = PerceptionEnvironment::new(3.0);
        let observer = ObserverPerception::default();
        assert_eq!(observer.channel_score(SensoryChannel::Taste, &env, 0.7), 0.7);
    }
}
