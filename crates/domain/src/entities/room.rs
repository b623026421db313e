use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, ReadableId, RoomId};
use crate::value_objects::Position;

/// A rectangular room spanning `(0, 0)..=(extend_x, extend_y)`
///
/// # Invariants
///
/// - `entities` lists exactly the entities whose placement is this room.
/// - `connectors` lists the connectors with a side in this room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    id: Option<RoomId>,
    readable_id: Option<ReadableId>,

    name: String,
    extend_x: f64,
    extend_y: f64,
    material: Option<String>,
    description: Option<String>,
    uniqueness: f64,

    // Ambient conditions, 0..1
    light_level: f64,
    ambient_noise: f64,
    ambient_smell: f64,

    entities: BTreeSet<EntityId>,
    connectors: BTreeSet<EntityId>,
}

impl Room {
    pub fn new(name: impl Into<String>, extend_x: f64, extend_y: f64) -> Self {
        Self {
            id: None,
            readable_id: None,
            name: name.into(),
            extend_x,
            extend_y,
            material: None,
            description: None,
            uniqueness: 0.5,
            light_level: 0.5,
            ambient_noise: 0.5,
            ambient_smell: 0.5,
            entities: BTreeSet::new(),
            connectors: BTreeSet::new(),
        }
    }

    /// Small 1 x 3 side room.
    pub fn chamber() -> Self {
        Self::new("chamber", 1.0, 3.0)
    }

    /// Two meter wide hallway of the given length.
    pub fn corridor(length: f64) -> Self {
        Self::new("corridor", length, 2.0)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
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

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: f64) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    #[inline]
    pub fn id(&self) -> Option<RoomId> {
        self.id
    }

    #[inline]
    pub fn readable_id(&self) -> Option<&ReadableId> {
        self.readable_id.as_ref()
    }

    pub fn label(&self) -> &str {
        self.readable_id
            .as_ref()
            .map(ReadableId::as_str)
            .unwrap_or(&self.name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn extend_x(&self) -> f64 {
        self.extend_x
    }

    #[inline]
    pub fn extend_y(&self) -> f64 {
        self.extend_y
    }

    #[inline]
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn uniqueness(&self) -> f64 {
        self.uniqueness
    }

    #[inline]
    pub fn light_level(&self) -> f64 {
        self.light_level
    }

    #[inline]
    pub fn ambient_noise(&self) -> f64 {
        self.ambient_noise
    }

    #[inline]
    pub fn ambient_smell(&self) -> f64 {
        self.ambient_smell
    }

    #[inline]
    pub fn entities(&self) -> &BTreeSet<EntityId> {
        &self.entities
    }

    #[inline]
    pub fn connectors(&self) -> &BTreeSet<EntityId> {
        &self.connectors
    }

    pub fn contains_point(&self, position: &Position) -> bool {
        (0.0..=self.extend_x).contains(&position.x) && (0.0..=self.extend_y).contains(&position.y)
    }

    pub(crate) fn register(&mut self, id: RoomId) {
        self.readable_id = Some(ReadableId::compose(&self.name, id.as_u64()));
        self.id = Some(id);
    }

    pub(crate) fn entities_mut(&mut self) -> &mut BTreeSet<EntityId> {
        &mut self.entities
    }

    pub(crate) fn connectors_mut(&mut self) -> &mut BTreeSet<EntityId> {
        &mut self.connectors
    }
}
