//! Multi-channel perception model
//!
//! Signals flow in three stages: the [`PerceptionEnvironment`] turns distance
//! and ambient conditions into a per-channel signal, the
//! [`ObserverPerception`] applies personal modifiers, and each [`Datum`]
//! compares the result against its own threshold and depth gate.

mod channel;
mod datum;
mod environment;
mod observer;

pub use channel::{Interaction, InteractionMeta, InteractionSense, SensoryChannel};
pub use datum::{Datum, DatumGate, DatumOperator, DatumPredicate, DatumProbe, PerceivedInfo};
pub use environment::{
    channel_effective, ChannelFalloff, FalloffKind, PerceptionEnvironment, HEARING_RANGE_M,
    MAX_COMBINED_EFFORT, SMELL_RANGE_M, TOUCH_RANGE_M, VISION_RANGE_M,
};
pub use observer::{ObserverPerception, DYNAMIC_RANGE_DB, LOUD_SOUND_DB, SPEECH_DB};
