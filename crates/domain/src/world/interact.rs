//! Capability dispatch and connector traversal

use crate::capabilities::{Capability, InteractionContext};
use crate::entities::{Entity, Placement};
use crate::ids::{EntityId, RoomId};
use crate::noise::NoiseSource;
use crate::perception::Interaction;
use crate::results::{ActionError, InteractionResult};
use crate::value_objects::{ActionTry, ActionType, Depth, Position};

use super::World;

impl World {
    /// Attempt `action` by `actor` on `target`.
    ///
    /// The target must be reachable from the actor's room and within
    /// `interaction_distance` of the actor, measured to its outermost
    /// container. Connectors additionally handle `USE` (walk through) and
    /// `LOOK_THROUGH`; every other action goes to the first capability that
    /// supports it. Nothing is mutated when an error is returned.
    pub fn interact(
        &mut self,
        actor: EntityId,
        target: EntityId,
        action: &ActionTry,
        noise: &mut dyn NoiseSource,
    ) -> InteractionResult {
        let (actor_room, actor_position) = self.locate_actor(actor)?;
        let target_entity = self.entity(target).ok_or_else(|| unknown_entity(target))?;
        if let Some(key) = action.item {
            self.entity(key).ok_or_else(|| unknown_entity(key))?;
        }

        if target_entity.is_connector() {
            return self.interact_connector(actor, actor_room, actor_position, target, action, noise);
        }

        if self.room_of(target) != Some(actor_room) {
            return Err(not_in_room(target_entity.label(), action.kind.as_str()));
        }
        self.check_reach(actor_position, target)?;
        self.dispatch(actor, target, action)
    }

    fn interact_connector(
        &mut self,
        actor: EntityId,
        actor_room: RoomId,
        actor_position: Position,
        door: EntityId,
        action: &ActionTry,
        noise: &mut dyn NoiseSource,
    ) -> InteractionResult {
        let entity = self.entity(door).ok_or_else(|| unknown_entity(door))?;
        let label = entity.label().to_string();
        let Some(door_position) = entity
            .connector_sides()
            .and_then(|sides| sides.position_in(actor_room))
        else {
            return Err(ActionError::hard(format!("{} does not lead out of your room.", label))
                .with_console(format!(
                    "Connector '{}' has no side in room '{}'.",
                    label,
                    self.room_label(actor_room)
                ))
                .with_hint("Move to a room that contains the door before using it.")
                .with_context("target", label.as_str())
                .with_context("action", action.kind.as_str()));
        };
        self.check_reach_to(actor_position, &label, door_position)?;

        match action.kind {
            ActionType::LookThrough => self.look_through(actor, actor_room, door, noise),
            ActionType::Use => self.go_through(actor, actor_room, door),
            _ => self.dispatch(actor, door, action),
        }
    }

    /// Hand the action to the first capability on `target` that supports it.
    fn dispatch(&mut self, actor: EntityId, target: EntityId, action: &ActionTry) -> InteractionResult {
        let actor_label = self.label(actor);
        let key_label = action.item.map(|key| self.label(key));
        let entity = self.entity(target).ok_or_else(|| unknown_entity(target))?;
        let owner_label = entity.label().to_string();
        let is_locked = entity.is_locked();
        let is_open = entity.is_open();

        let Some(kind) = entity
            .capabilities()
            .find(|c| c.supports(action.kind))
            .map(Capability::kind)
        else {
            return Err(ActionError::hard(format!("You cannot {} {}.", action.kind, owner_label))
                .with_console(format!(
                    "No capability on '{}' handles action '{}'.",
                    owner_label, action.kind
                ))
                .with_hint("Try a different operator or interact with another object.")
                .with_context("target", owner_label.as_str())
                .with_context("action", action.kind.as_str()));
        };

        let ctx = InteractionContext {
            actor,
            actor_label: &actor_label,
            owner: target,
            owner_label: &owner_label,
            key_label: key_label.as_deref(),
            is_locked,
            is_open,
        };
        let capability = self
            .entity_mut(target)
            .and_then(|e| e.capability_mut(kind))
            .ok_or_else(|| unknown_entity(target))?;
        capability.on_interact(&ctx, action)
    }

    fn look_through(
        &self,
        actor: EntityId,
        actor_room: RoomId,
        door: EntityId,
        noise: &mut dyn NoiseSource,
    ) -> InteractionResult {
        let entity = self.entity(door).ok_or_else(|| unknown_entity(door))?;
        let label = entity.label();
        if entity.is_open() == Some(false) {
            return Err(ActionError::soft(format!("{} is closed; you cannot see through it.", label))
                .with_console(format!("Look-through blocked because '{}' is closed.", label))
                .with_hint("Open it first.")
                .with_context("target", label)
                .with_context("action", ActionType::LookThrough.as_str()));
        }
        let (far_room, far_position) = far_side(entity, actor_room, ActionType::LookThrough)?;

        let observer = self.entity(actor).ok_or_else(|| unknown_entity(actor))?;
        let seen = self.perceive_room_from(
            observer,
            far_room,
            far_position,
            Depth::Normal,
            &[Interaction::Look],
            noise,
        );
        let room_label = self.room_label(far_room);

        if seen.is_empty() {
            return Ok(format!(
                "Through {} you see into {}: nothing of interest.",
                label, room_label
            ));
        }
        let rendered = serde_json::to_string(&seen).map_err(|err| {
            ActionError::hard("The view could not be described.")
                .with_console(format!("Serializing look-through view failed: {}", err))
                .with_context("target", label)
        })?;
        Ok(format!("Through {} you see into {}: {}", label, room_label, rendered))
    }

    /// Walk the actor through an open, unlocked connector.
    fn go_through(&mut self, actor: EntityId, actor_room: RoomId, door: EntityId) -> InteractionResult {
        let entity = self.entity(door).ok_or_else(|| unknown_entity(door))?;
        let label = entity.label();

        if entity.is_locked() == Some(true) {
            return Err(ActionError::soft(format!("{} is locked.", label))
                .with_console(format!("Traversal blocked because '{}' is locked.", label))
                .with_hint("Unlock it with a matching key first.")
                .with_context("target", label)
                .with_context("action", ActionType::Use.as_str()));
        }
        if entity.is_open() == Some(false) {
            return Err(ActionError::soft(format!("{} is closed.", label))
                .with_console(format!("Traversal blocked because '{}' is closed.", label))
                .with_hint("Open it first.")
                .with_context("target", label)
                .with_context("action", ActionType::Use.as_str()));
        }
        let (far_room, far_position) = far_side(entity, actor_room, ActionType::Use)?;
        let label = label.to_string();

        if let Some(room) = self.rooms.get_mut(&actor_room) {
            room.entities_mut().remove(&actor);
        }
        if let Some(room) = self.rooms.get_mut(&far_room) {
            room.entities_mut().insert(actor);
        }
        if let Some(agent) = self.entity_mut(actor) {
            agent.set_placement(Placement::Room(far_room));
            agent.set_position(Some(far_position));
        }

        let room_name = self
            .room(far_room)
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::debug!(
            actor = %self.label(actor),
            door = %label,
            room = %self.room_label(far_room),
            "Actor went through connector"
        );
        Ok(format!("Went through {} into {}", label, room_name))
    }

    // =========================================================================
    // Shared checks
    // =========================================================================

    /// Room and position of an acting entity.
    pub(super) fn locate_actor(&self, actor: EntityId) -> Result<(RoomId, Position), ActionError> {
        let entity = self.entity(actor).ok_or_else(|| unknown_entity(actor))?;
        let room = entity.room().ok_or_else(|| {
            ActionError::hard(format!("{} is not in any room.", entity.label()))
                .with_context("actor", entity.label())
        })?;
        let position = entity.position().ok_or_else(|| {
            ActionError::hard(format!("{} has no position.", entity.label()))
                .with_context("actor", entity.label())
        })?;
        Ok((room, position))
    }

    /// Soft failure unless `target` (or its outermost container) is within
    /// `interaction_distance` of `from`.
    pub(super) fn check_reach(&self, from: Position, target: EntityId) -> Result<(), ActionError> {
        let label = self.label(target);
        let anchor = self.outermost(target);
        let position = self.entity(anchor).and_then(Entity::position).ok_or_else(|| {
            ActionError::soft(format!("You cannot tell where {} is.", label))
                .with_console(format!("'{}' has no resolvable position.", label))
                .with_hint("Move to the object or its container first.")
                .with_context("target", label.as_str())
        })?;
        self.check_reach_to(from, &label, position)
    }

    pub(super) fn check_reach_to(
        &self,
        from: Position,
        label: &str,
        position: Position,
    ) -> Result<(), ActionError> {
        let distance = from.distance_to(&position);
        let limit = self.settings().interaction_distance;
        if distance > limit {
            return Err(ActionError::soft(format!("{} is out of reach.", label))
                .with_console(format!(
                    "'{}' is {:.2} m away; interaction distance is {:.2} m.",
                    label, distance, limit
                ))
                .with_hint("Move closer to it first.")
                .with_context("target", label)
                .with_context("distance", distance)
                .with_context("limit", limit));
        }
        Ok(())
    }
}

pub(super) fn unknown_entity(id: EntityId) -> ActionError {
    ActionError::hard(format!("There is no object with id {}.", id))
        .with_console(format!("Entity {} is not registered.", id))
        .with_hint("Use an id listed in your observation.")
        .with_context("id", id.as_u64())
}

pub(super) fn not_in_room(label: &str, action: &str) -> ActionError {
    ActionError::hard(format!("{} is not in your room.", label))
        .with_console(format!("'{}' cannot be reached from the actor's room.", label))
        .with_hint("Only interact with objects you can currently observe.")
        .with_context("target", label)
        .with_context("action", action)
}

fn far_side(
    door: &Entity,
    room: RoomId,
    action: ActionType,
) -> Result<(RoomId, Position), ActionError> {
    door.connector_sides()
        .and_then(|sides| sides.other_side(room))
        .ok_or_else(|| {
            ActionError::hard(format!("{} leads nowhere.", door.label()))
                .with_console(format!("Connector '{}' has no second side.", door.label()))
                .with_context("target", door.label())
                .with_context("action", action.as_str())
        })
}
