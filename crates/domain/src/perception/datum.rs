//! Datum-level disclosure rules
//!
//! A [`Datum`] is one fact about an entity (`key`/`value`) together with the
//! rules deciding whether a given observer can currently know it. Every datum
//! on an entity is evaluated on its own, so an observer may learn the name of
//! an object without its material.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::channel::SensoryChannel;
use super::environment::PerceptionEnvironment;
use super::observer::ObserverPerception;
use crate::value_objects::{Depth, PerceptionMode, SimulationSettings};

const TRACE_TARGET: &str = "roomsense::perception";

/// How the per-channel results of a sensory datum combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatumOperator {
    /// Any required channel suffices
    #[default]
    Or,
    /// Every required channel must pass; an inactive one fails
    And,
}

/// Everything a datum may look at when deciding disclosure
#[derive(Debug, Clone, Copy)]
pub struct DatumProbe<'a> {
    pub observer: &'a ObserverPerception,
    pub env: &'a PerceptionEnvironment,
    pub prominence: f64,
    pub uniqueness: f64,
    pub entity_label: &'a str,
    pub observer_label: &'a str,
}

impl DatumProbe<'_> {
    /// Environmental signal on `channel`, zero when no interaction enables it.
    pub fn signal(&self, channel: SensoryChannel) -> f64 {
        self.env.signal_strength(channel)
    }
}

pub type DatumPredicate = Arc<dyn Fn(&DatumProbe<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum DatumGate {
    Sensory {
        requirements: BTreeMap<SensoryChannel, f64>,
        detect_threshold: f64,
        op: DatumOperator,
    },
    Composite(DatumPredicate),
}

impl fmt::Debug for DatumGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensory {
                requirements,
                detect_threshold,
                op,
            } => f
                .debug_struct("Sensory")
                .field("requirements", requirements)
                .field("detect_threshold", detect_threshold)
                .field("op", op)
                .finish(),
            Self::Composite(_) => f.write_str("Composite(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Datum {
    key: String,
    value: Value,
    min_depth: Depth,
    gate: DatumGate,
}

impl Datum {
    /// Sensory datum with no channel requirements yet, gated at `Basic`,
    /// threshold 0.5, combined with OR.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            min_depth: Depth::Basic,
            gate: DatumGate::Sensory {
                requirements: BTreeMap::new(),
                detect_threshold: 0.5,
                op: DatumOperator::Or,
            },
        }
    }

    /// Datum decided by `predicate` once the depth gate passes.
    pub fn composite<F>(key: impl Into<String>, value: impl Into<Value>, predicate: F) -> Self
    where
        F: Fn(&DatumProbe<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            value: value.into(),
            min_depth: Depth::Basic,
            gate: DatumGate::Composite(Arc::new(predicate)),
        }
    }

    /// Require `channel` at `intensity`. No effect on composite datums.
    pub fn requires(mut self, channel: SensoryChannel, intensity: f64) -> Self {
        if let DatumGate::Sensory { requirements, .. } = &mut self.gate {
            requirements.insert(channel, intensity);
        }
        self
    }

    pub fn with_min_depth(mut self, depth: Depth) -> Self {
        self.min_depth = depth;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        if let DatumGate::Sensory {
            detect_threshold, ..
        } = &mut self.gate
        {
            *detect_threshold = threshold;
        }
        self
    }

    pub fn with_operator(mut self, operator: DatumOperator) -> Self {
        if let DatumGate::Sensory { op, .. } = &mut self.gate {
            *op = operator;
        }
        self
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn min_depth(&self) -> Depth {
        self.min_depth
    }

    #[inline]
    pub fn gate(&self) -> &DatumGate {
        &self.gate
    }

    /// Whether the observer in `probe` perceives this fact at `level`.
    pub fn is_perceived(&self, probe: &DatumProbe<'_>, level: Depth) -> bool {
        if level < self.min_depth {
            tracing::trace!(
                target: TRACE_TARGET,
                entity = probe.entity_label,
                observer = probe.observer_label,
                datum = %self.key,
                level = %level,
                min_depth = %self.min_depth,
                "Requested depth below minimum"
            );
            return false;
        }

        match &self.gate {
            DatumGate::Composite(predicate) => predicate(probe),
            DatumGate::Sensory {
                requirements,
                detect_threshold,
                op,
            } => self.sensory_check(probe, level, requirements, *detect_threshold, *op),
        }
    }

    fn sensory_check(
        &self,
        probe: &DatumProbe<'_>,
        level: Depth,
        requirements: &BTreeMap<SensoryChannel, f64>,
        detect_threshold: f64,
        op: DatumOperator,
    ) -> bool {
        let active = probe.env.active_channels();
        if !requirements.keys().any(|c| active.contains(c)) {
            tracing::trace!(
                target: TRACE_TARGET,
                entity = probe.entity_label,
                observer = probe.observer_label,
                datum = %self.key,
                "No required sensory channel is active"
            );
            return false;
        }

        let boost = 1.0 + (f64::from(level.value()) / f64::from(Depth::Full.value())) * 0.4;
        let mut results = Vec::with_capacity(requirements.len());

        for (&channel, &required) in requirements {
            if !active.contains(&channel) {
                if op == DatumOperator::And {
                    results.push(false);
                }
                continue;
            }

            let intensity = required * probe.prominence;
            let score = probe.observer.channel_score(channel, probe.env, intensity);
            let effort = probe.env.combined_effort(channel);
            let after_effort = (score * effort).min(1.0);
            let final_score = (after_effort * boost).min(1.0);
            let passed = final_score >= detect_threshold;

            tracing::trace!(
                target: TRACE_TARGET,
                entity = probe.entity_label,
                observer = probe.observer_label,
                datum = %self.key,
                channel = %channel,
                intensity,
                score,
                effort,
                boost,
                final_score,
                detect_threshold,
                passed,
                "Channel evaluated"
            );
            results.push(passed);
        }

        match op {
            DatumOperator::And => results.iter().all(|&p| p),
            DatumOperator::Or => results.iter().any(|&p| p),
        }
    }

    /// Evaluate under the configured perception mode and record the outcome
    /// in `info`. Returns whether the fact was disclosed.
    pub fn perceive(
        &self,
        probe: &DatumProbe<'_>,
        level: Depth,
        settings: &SimulationSettings,
        info: &mut PerceivedInfo,
    ) -> bool {
        let perceived = match settings.perception_mode {
            PerceptionMode::Sense => self.is_perceived(probe, level),
            PerceptionMode::Distance => {
                probe.env.distance_m <= settings.perception_distance && level >= self.min_depth
            }
            PerceptionMode::All => true,
        };

        if perceived {
            info.disclose(&self.key, self.value.clone());
        } else {
            info.mark_unknown();
        }
        perceived
    }
}

/// Facts an observer has learned about one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerceivedInfo {
    fields: Map<String, Value>,
    disclosed: BTreeSet<String>,
}

impl PerceivedInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fact that passed its datum.
    pub fn disclose(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
        self.disclosed.insert(key.to_string());
    }

    pub fn is_disclosed(&self, key: &str) -> bool {
        self.disclosed.contains(key)
    }

    /// Flag that at least one fact about the object stayed hidden.
    pub fn mark_unknown(&mut self) {
        self.fields
            .insert("object".to_string(), Value::from("unknown"));
    }

    /// Set a derived field that is not gated by a datum of its own.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }
}
