//! World registry - the explicit per-episode owner of rooms and entities
//!
//! One `World` value exists per episode and is passed by reference through
//! every call. Rooms and entities draw ids from a single counter, so after
//! [`World::clear`] a level built the same way receives the same ids.
//!
//! Level construction goes through the `DomainError`-returning methods in
//! this file. Agent-facing operations live in the submodules and return
//! [`ActionError`](crate::results::ActionError)s instead.

mod agent;
mod interact;
mod perceive;

use std::collections::BTreeMap;

use crate::entities::{Entity, Placement, Room};
use crate::error::DomainError;
use crate::ids::{EntityId, RoomId};
use crate::value_objects::{Position, SimulationSettings};

#[derive(Debug, Clone, Default)]
pub struct World {
    settings: SimulationSettings,
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    rooms: BTreeMap<RoomId, Room>,
}

impl World {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    #[inline]
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SimulationSettings) {
        self.settings = settings;
    }

    fn issue_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an entity, assigning its id and readable id.
    pub fn add_entity(&mut self, mut entity: Entity) -> Result<EntityId, DomainError> {
        if entity.id().is_some() {
            return Err(DomainError::already_registered("Entity", entity.name()));
        }
        if entity.name().trim().is_empty() {
            return Err(DomainError::validation("name must be a non-empty string"));
        }
        if entity.placement() != Placement::Detached {
            return Err(DomainError::constraint(format!(
                "'{}' must be registered before it is placed",
                entity.name()
            )));
        }

        let id = EntityId::from_raw(self.issue_id());
        entity.register(id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    pub fn add_room(&mut self, mut room: Room) -> Result<RoomId, DomainError> {
        if room.id().is_some() {
            return Err(DomainError::already_registered("Room", room.name()));
        }
        if room.name().trim().is_empty() {
            return Err(DomainError::validation("name must be a non-empty string"));
        }
        if room.extend_x() < 0.0 || room.extend_y() < 0.0 {
            return Err(DomainError::validation(format!(
                "room '{}' has negative extents",
                room.name()
            )));
        }

        let id = RoomId::from_raw(self.issue_id());
        room.register(id);
        self.rooms.insert(id, room);
        Ok(id)
    }

    /// Remove an entity from the registry, unlinking it from its room,
    /// container or carrier. Its children are detached, not removed.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        if !self.entities.contains_key(&id) {
            return None;
        }
        self.detach(id);

        let connector_rooms: Vec<RoomId> = self
            .entities
            .get(&id)
            .and_then(Entity::connector_sides)
            .map(|sides| sides.rooms().collect())
            .unwrap_or_default();
        for room in connector_rooms {
            if let Some(room) = self.rooms.get_mut(&room) {
                room.connectors_mut().remove(&id);
            }
        }

        let mut entity = self.entities.remove(&id)?;
        for child in std::mem::take(entity.children_mut()) {
            if let Some(child) = self.entities.get_mut(&child) {
                child.set_placement(Placement::Detached);
            }
        }
        Some(entity)
    }

    /// Forget every room and entity and restart the id counter.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.rooms.clear();
        self.next_id = 0;
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    #[inline]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    #[inline]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn find_by_readable_id(&self, readable_id: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, e)| e.readable_id().is_some_and(|r| r.as_str() == readable_id))
            .map(|(id, _)| *id)
    }

    pub fn find_room_by_readable_id(&self, readable_id: &str) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|(_, r)| r.readable_id().is_some_and(|rid| rid.as_str() == readable_id))
            .map(|(id, _)| *id)
    }

    /// First registered entity with this name.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, e)| e.name() == name)
            .map(|(id, _)| *id)
    }

    /// Readable id of an entity, `"unknown"` when it is not registered.
    pub fn label(&self, id: EntityId) -> String {
        self.entities
            .get(&id)
            .map(|e| e.label().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn room_label(&self, id: RoomId) -> String {
        self.rooms
            .get(&id)
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn require_entity(&self, id: EntityId) -> Result<&Entity, DomainError> {
        self.entities
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Entity", id))
    }

    fn require_room(&self, id: RoomId) -> Result<&Room, DomainError> {
        self.rooms
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Room", id))
    }

    // =========================================================================
    // Room membership
    // =========================================================================

    /// Put a detached entity into a room at its current position.
    pub fn enter(&mut self, entity_id: EntityId, room_id: RoomId) -> Result<(), DomainError> {
        let entity = self.require_entity(entity_id)?;
        let room = self.require_room(room_id)?;

        if entity.is_connector() {
            return Err(DomainError::constraint(format!(
                "connector '{}' is attached to rooms, not entered",
                entity.label()
            )));
        }
        if entity.placement() != Placement::Detached {
            return Err(DomainError::constraint(format!(
                "'{}' is already placed",
                entity.label()
            )));
        }
        let position = entity.position().ok_or_else(|| {
            DomainError::validation(format!("'{}' has no position", entity.label()))
        })?;
        if !room.contains_point(&position) {
            return Err(out_of_bounds(room, position));
        }

        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.entities_mut().insert(entity_id);
        }
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.set_placement(Placement::Room(room_id));
        }
        Ok(())
    }

    /// Set the position of a detached entity and enter the room.
    pub fn place(
        &mut self,
        entity_id: EntityId,
        room_id: RoomId,
        position: Position,
    ) -> Result<(), DomainError> {
        let entity = self.require_entity(entity_id)?;
        if entity.placement() != Placement::Detached {
            return Err(DomainError::constraint(format!(
                "'{}' is already placed",
                entity.label()
            )));
        }
        let previous = entity.position();
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.set_position(Some(position));
        }
        self.enter(entity_id, room_id).inspect_err(|_| {
            if let Some(entity) = self.entities.get_mut(&entity_id) {
                entity.set_position(previous);
            }
        })
    }

    /// Take an entity out of its room. No-op when it is in no room.
    pub fn leave(&mut self, entity_id: EntityId) -> Result<(), DomainError> {
        let entity = self.require_entity(entity_id)?;
        let Some(room_id) = entity.room() else {
            tracing::debug!(entity = %entity.label(), "leave ignored, entity is in no room");
            return Ok(());
        };

        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.entities_mut().remove(&entity_id);
        }
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.set_placement(Placement::Detached);
        }
        Ok(())
    }

    /// Unlink an entity from wherever it is.
    pub(crate) fn detach(&mut self, entity_id: EntityId) {
        let Some(placement) = self.entities.get(&entity_id).map(Entity::placement) else {
            return;
        };
        match placement {
            Placement::Detached => {}
            Placement::Room(room) => {
                if let Some(room) = self.rooms.get_mut(&room) {
                    room.entities_mut().remove(&entity_id);
                }
            }
            Placement::Container(parent) => {
                if let Some(parent) = self.entities.get_mut(&parent) {
                    parent.children_mut().remove(&entity_id);
                }
            }
            Placement::Carried(agent) => {
                if let Some(inventory) = self.entities.get_mut(&agent).and_then(Entity::inventory_mut) {
                    inventory.retain(|item| *item != entity_id);
                }
            }
        }
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.set_placement(Placement::Detached);
        }
    }

    // =========================================================================
    // Containment
    // =========================================================================

    /// Put a detached entity into a container.
    ///
    /// Adding an existing child again is a no-op. Self-containment and cycles
    /// are rejected.
    pub fn add_child(&mut self, parent_id: EntityId, child_id: EntityId) -> Result<(), DomainError> {
        let parent = self.require_entity(parent_id)?;
        let child = self.require_entity(child_id)?;

        if !parent.is_container() {
            return Err(DomainError::constraint(format!(
                "'{}' cannot hold other objects",
                parent.label()
            )));
        }
        if parent_id == child_id {
            return Err(DomainError::constraint("Entity cannot be its own child"));
        }
        if parent.children().contains(&child_id) {
            return Ok(());
        }
        if child.placement() != Placement::Detached {
            return Err(DomainError::constraint(format!(
                "'{}' is already placed",
                child.label()
            )));
        }
        if self.has_descendant(child_id, parent_id) {
            return Err(DomainError::constraint(format!(
                "Adding {} would create a cycle",
                child.label()
            )));
        }

        if let Some(parent) = self.entities.get_mut(&parent_id) {
            parent.children_mut().insert(child_id);
        }
        if let Some(child) = self.entities.get_mut(&child_id) {
            child.set_placement(Placement::Container(parent_id));
            child.set_position(None);
        }
        Ok(())
    }

    pub fn remove_child(&mut self, parent_id: EntityId, child_id: EntityId) -> Result<(), DomainError> {
        let parent = self.require_entity(parent_id)?;
        if !parent.children().contains(&child_id) {
            return Err(DomainError::constraint(format!(
                "'{}' does not hold '{}'",
                parent.label(),
                self.label(child_id)
            )));
        }
        self.detach(child_id);
        Ok(())
    }

    /// Whether `target` is nested anywhere below `ancestor`.
    pub fn has_descendant(&self, ancestor: EntityId, target: EntityId) -> bool {
        let mut stack: Vec<EntityId> = match self.entities.get(&ancestor) {
            Some(entity) => entity.children().iter().copied().collect(),
            None => return false,
        };
        let mut visited = std::collections::BTreeSet::new();

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(entity) = self.entities.get(&current) {
                stack.extend(entity.children().iter().copied());
            }
        }
        false
    }

    /// Top of the container or carrier chain above `id` (itself when loose).
    pub fn outermost(&self, id: EntityId) -> EntityId {
        let mut current = id;
        // Bounded by the number of entities since cycles are rejected on insert
        for _ in 0..=self.entities.len() {
            match self.entities.get(&current).and_then(Entity::parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Room an entity is in, directly or through its containers.
    pub fn room_of(&self, id: EntityId) -> Option<RoomId> {
        self.entities.get(&self.outermost(id)).and_then(Entity::room)
    }

    // =========================================================================
    // Connectors and keys
    // =========================================================================

    /// Create a door linking two rooms at the given positions.
    pub fn connect_rooms(
        &mut self,
        room_a: RoomId,
        position_a: Position,
        room_b: RoomId,
        position_b: Position,
        description: Option<&str>,
    ) -> Result<EntityId, DomainError> {
        if room_a == room_b {
            return Err(DomainError::constraint("a connector must link two different rooms"));
        }
        for (room_id, position) in [(room_a, position_a), (room_b, position_b)] {
            let room = self.require_room(room_id)?;
            if !room.contains_point(&position) {
                return Err(out_of_bounds(room, position));
            }
        }

        let mut door = Entity::connector("door");
        if let Some(description) = description {
            door = door.with_description(description);
        }
        let door = self.add_entity(door)?;
        self.attach_connector(door, room_a, position_a)?;
        self.attach_connector(door, room_b, position_b)?;
        tracing::debug!(
            door = %self.label(door),
            from = %self.room_label(room_a),
            to = %self.room_label(room_b),
            "Rooms connected"
        );
        Ok(door)
    }

    /// Give a connector a side in `room`. A connector links at most two rooms.
    pub fn attach_connector(
        &mut self,
        connector_id: EntityId,
        room_id: RoomId,
        position: Position,
    ) -> Result<(), DomainError> {
        let connector = self.require_entity(connector_id)?;
        let room = self.require_room(room_id)?;
        let sides = connector.connector_sides().ok_or_else(|| {
            DomainError::constraint(format!("'{}' is not a connector", connector.label()))
        })?;
        if !room.contains_point(&position) {
            return Err(out_of_bounds(room, position));
        }
        if !sides.links(room_id) && sides.len() >= 2 {
            return Err(DomainError::constraint(format!(
                "connector '{}' already links two rooms",
                connector.label()
            )));
        }

        if let Some(connector) = self.entities.get_mut(&connector_id) {
            if connector.position().is_none() {
                connector.set_position(Some(position));
            }
            if let Some(sides) = connector.connector_sides_mut() {
                sides.insert(room_id, position);
            }
        }
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.connectors_mut().insert(connector_id);
        }
        Ok(())
    }

    /// Allow `key` to operate the lock on `target`.
    pub fn allow_key(&mut self, target: EntityId, key: EntityId) -> Result<(), DomainError> {
        self.require_entity(key)?;
        let target = self
            .entities
            .get_mut(&target)
            .ok_or_else(|| DomainError::not_found("Entity", target))?;
        let label = target.label().to_string();
        let lockable = target
            .lockable_mut()
            .ok_or_else(|| DomainError::constraint(format!("'{}' has no lock", label)))?;
        lockable.allow_key(key);
        Ok(())
    }
}

fn out_of_bounds(room: &Room, position: Position) -> DomainError {
    DomainError::OutOfBounds {
        room: room.label().to_string(),
        x: position.x,
        y: position.y,
        extend_x: room.extend_x(),
        extend_y: room.extend_y(),
    }
}
