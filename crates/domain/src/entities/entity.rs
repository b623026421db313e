//! Entity aggregate - anything that can be placed, perceived or interacted with
//!
//! Items, containers, connectors and agents share one struct; the variant
//! specific state lives in [`EntityKind`]. Relationships between entities
//! are stored as ids (`placement`, `children`), never as references, so the
//! [`World`](crate::world::World) registry is the single owner of every entity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::capabilities::{Capability, CapabilityKind, Lockable, Openable};
use crate::ids::{EntityId, ReadableId, RoomId};
use crate::perception::{Datum, ObserverPerception};
use crate::value_objects::Position;

/// Where an entity currently is
///
/// # Invariants
///
/// - An entity is in at most one room, one container, or one inventory.
/// - Membership is symmetric: the room, container or agent lists the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Detached,
    Room(RoomId),
    Container(EntityId),
    Carried(EntityId),
}

/// Positions of a connector, one per room it links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSides {
    sides: BTreeMap<RoomId, Position>,
}

impl ConnectorSides {
    pub fn position_in(&self, room: RoomId) -> Option<Position> {
        self.sides.get(&room).copied()
    }

    /// The side that is not `room`.
    pub fn other_side(&self, room: RoomId) -> Option<(RoomId, Position)> {
        self.sides
            .iter()
            .find(|(id, _)| **id != room)
            .map(|(id, pos)| (*id, *pos))
    }

    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.sides.keys().copied()
    }

    pub fn links(&self, room: RoomId) -> bool {
        self.sides.contains_key(&room)
    }

    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    pub(crate) fn insert(&mut self, room: RoomId, position: Position) {
        self.sides.insert(room, position);
    }
}

/// Perception profile and inventory of an acting agent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    perception: ObserverPerception,
    inventory: Vec<EntityId>,
}

impl AgentState {
    #[inline]
    pub fn perception(&self) -> &ObserverPerception {
        &self.perception
    }

    #[inline]
    pub fn inventory(&self) -> &[EntityId] {
        &self.inventory
    }

    pub fn carries(&self, item: EntityId) -> bool {
        self.inventory.contains(&item)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Item,
    /// Can hold other entities as children
    Container,
    /// Door-like link between two rooms
    Connector(ConnectorSides),
    Agent(AgentState),
}

#[derive(Debug, Clone)]
pub struct Entity {
    // Identity, assigned once on registration
    id: Option<EntityId>,
    readable_id: Option<ReadableId>,

    name: String,
    kind: EntityKind,
    position: Option<Position>,
    material: Option<String>,
    description: Option<String>,

    /// Scales signal strength of every channel, 0..1
    prominence: f64,
    /// How easily this object is told apart from similar ones, 0..1
    uniqueness: f64,
    /// How much of the contents show when open, 0..1
    visibility: f64,
    is_collectible: bool,

    placement: Placement,
    children: BTreeSet<EntityId>,
    capabilities: BTreeMap<CapabilityKind, Capability>,
    extra_data: Vec<Datum>,
}

impl Entity {
    // =========================================================================
    // Constructors
    // =========================================================================

    fn with_kind(name: impl Into<String>, kind: EntityKind, is_collectible: bool) -> Self {
        Self {
            id: None,
            readable_id: None,
            name: name.into(),
            kind,
            position: None,
            material: None,
            description: None,
            prominence: 1.0,
            uniqueness: 0.5,
            visibility: 1.0,
            is_collectible,
            placement: Placement::Detached,
            children: BTreeSet::new(),
            capabilities: BTreeMap::new(),
            extra_data: Vec::new(),
        }
    }

    /// A plain, collectible object.
    pub fn item(name: impl Into<String>) -> Self {
        Self::with_kind(name, EntityKind::Item, true)
    }

    /// A fixed object that can hold others.
    pub fn container(name: impl Into<String>) -> Self {
        Self::with_kind(name, EntityKind::Container, false)
    }

    /// An open, unlocked connector with no sides yet.
    pub fn connector(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            EntityKind::Connector(ConnectorSides::default()),
            false,
        )
        .with_capability(Openable::new(true, 0.0))
        .with_capability(Lockable::new(false))
    }

    pub fn agent(name: impl Into<String>) -> Self {
        Self::with_kind(name, EntityKind::Agent(AgentState::default()), false)
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn at(self, x: f64, y: f64) -> Self {
        self.with_position(Position::new(x, y))
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = prominence;
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: f64) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_collectible(mut self, is_collectible: bool) -> Self {
        self.is_collectible = is_collectible;
        self
    }

    /// Attach a capability, replacing any earlier one of the same kind.
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        let capability = capability.into();
        self.capabilities.insert(capability.kind(), capability);
        self
    }

    /// Custom fact disclosed alongside the standard ones.
    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.extra_data.push(datum);
        self
    }

    /// Personal perception modifiers. No effect on non-agents.
    pub fn with_perception(mut self, perception: ObserverPerception) -> Self {
        if let EntityKind::Agent(state) = &mut self.kind {
            state.perception = perception;
        }
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    #[inline]
    pub fn readable_id(&self) -> Option<&ReadableId> {
        self.readable_id.as_ref()
    }

    /// Readable id, or the bare name before registration.
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
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
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
    pub fn prominence(&self) -> f64 {
        self.prominence
    }

    #[inline]
    pub fn uniqueness(&self) -> f64 {
        self.uniqueness
    }

    #[inline]
    pub fn visibility(&self) -> f64 {
        self.visibility
    }

    #[inline]
    pub fn is_collectible(&self) -> bool {
        self.is_collectible
    }

    #[inline]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Room this entity sits in directly, if any.
    pub fn room(&self) -> Option<RoomId> {
        match self.placement {
            Placement::Room(room) => Some(room),
            _ => None,
        }
    }

    /// Container or agent holding this entity, if any.
    pub fn parent(&self) -> Option<EntityId> {
        match self.placement {
            Placement::Container(parent) | Placement::Carried(parent) => Some(parent),
            _ => None,
        }
    }

    #[inline]
    pub fn children(&self) -> &BTreeSet<EntityId> {
        &self.children
    }

    #[inline]
    pub fn extra_data(&self) -> &[Datum] {
        &self.extra_data
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.values()
    }

    pub fn capability(&self, kind: CapabilityKind) -> Option<&Capability> {
        self.capabilities.get(&kind)
    }

    pub fn has_capability(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains_key(&kind)
    }

    pub fn openable(&self) -> Option<&Openable> {
        match self.capabilities.get(&CapabilityKind::Openable) {
            Some(Capability::Openable(openable)) => Some(openable),
            _ => None,
        }
    }

    pub fn lockable(&self) -> Option<&Lockable> {
        match self.capabilities.get(&CapabilityKind::Lockable) {
            Some(Capability::Lockable(lockable)) => Some(lockable),
            _ => None,
        }
    }

    /// `None` when the entity has no lid or leaf.
    pub fn is_open(&self) -> Option<bool> {
        self.openable().map(Openable::is_open)
    }

    /// `None` when the entity has no lock.
    pub fn is_locked(&self) -> Option<bool> {
        self.lockable().map(Lockable::is_locked)
    }

    /// Open, or without a lid at all.
    pub fn is_accessible(&self) -> bool {
        self.is_open().unwrap_or(true)
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, EntityKind::Container)
    }

    pub fn is_connector(&self) -> bool {
        matches!(self.kind, EntityKind::Connector(_))
    }

    pub fn connector_sides(&self) -> Option<&ConnectorSides> {
        match &self.kind {
            EntityKind::Connector(sides) => Some(sides),
            _ => None,
        }
    }

    pub fn agent_state(&self) -> Option<&AgentState> {
        match &self.kind {
            EntityKind::Agent(state) => Some(state),
            _ => None,
        }
    }

    // =========================================================================
    // Registry-owned mutations
    // =========================================================================

    pub(crate) fn register(&mut self, id: EntityId) {
        self.readable_id = Some(ReadableId::compose(&self.name, id.as_u64()));
        self.id = Some(id);
    }

    pub(crate) fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub(crate) fn set_collectible(&mut self, is_collectible: bool) {
        self.is_collectible = is_collectible;
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeSet<EntityId> {
        &mut self.children
    }

    pub(crate) fn capability_mut(&mut self, kind: CapabilityKind) -> Option<&mut Capability> {
        self.capabilities.get_mut(&kind)
    }

    pub(crate) fn lockable_mut(&mut self) -> Option<&mut Lockable> {
        match self.capabilities.get_mut(&CapabilityKind::Lockable) {
            Some(Capability::Lockable(lockable)) => Some(lockable),
            _ => None,
        }
    }

    pub(crate) fn connector_sides_mut(&mut self) -> Option<&mut ConnectorSides> {
        match &mut self.kind {
            EntityKind::Connector(sides) => Some(sides),
            _ => None,
        }
    }

    pub(crate) fn inventory_mut(&mut self) -> Option<&mut Vec<EntityId>> {
        match &mut self.kind {
            EntityKind::Agent(state) => Some(&mut state.inventory),
            _ => None,
        }
    }
}
