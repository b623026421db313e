//! Episode session - the orchestrator-facing wrapper around a `World`
//!
//! A session owns everything one episode needs: the world, the result
//! buffer, the noise source and the episode counters. Agents talk to it
//! with [`AgentCommand`]s naming objects by readable id. Every command
//! produces exactly one [`ResultRecord`], which is appended to the buffer
//! and returned.

use roomsense_domain::{
    ActionError, ActionTry, DomainError, EntityId, InteractionResult, NoiseSource, Position,
    ResultBuffer, ResultKind, ResultRecord, Room, RoomId, World,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::commands::{self, is_floor, AgentCommand};
use crate::config::EngineConfig;
use crate::levels::{self, PotatoLevel};
use crate::noise::SeededNoise;

/// Builds the noise source for an episode from its seed.
pub type NoiseFactory = Box<dyn Fn(u64) -> Box<dyn NoiseSource + Send> + Send>;

/// Per-episode counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub tool_calls: u32,
    pub soft_errors: u32,
    pub hard_errors: u32,
}

pub struct Session {
    world: World,
    results: ResultBuffer,
    noise: Box<dyn NoiseSource + Send>,
    noise_factory: NoiseFactory,
    config: EngineConfig,
    stats: EpisodeStats,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_noise(config, SeededNoise::new)
    }

    /// Session whose noise comes from `factory`, called with the configured
    /// seed on creation and on every reset.
    pub fn with_noise<F, N>(config: EngineConfig, factory: F) -> Self
    where
        F: Fn(u64) -> N + Send + 'static,
        N: NoiseSource + Send + 'static,
    {
        let noise_factory: NoiseFactory =
            Box::new(move |seed: u64| -> Box<dyn NoiseSource + Send> { Box::new(factory(seed)) });
        let noise = noise_factory(config.simulation.seed);
        Self {
            world: World::new(config.simulation.clone()),
            results: ResultBuffer::new(),
            noise,
            noise_factory,
            config,
            stats: EpisodeStats::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for level construction.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn results(&self) -> &ResultBuffer {
        &self.results
    }

    #[inline]
    pub fn stats(&self) -> EpisodeStats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Episode lifecycle
    // =========================================================================

    /// Start a fresh episode: empty world, empty buffer, zeroed counters and
    /// noise re-seeded from the settings.
    pub fn reset(&mut self) {
        self.world.clear();
        self.world.set_settings(self.config.simulation.clone());
        self.results.clear();
        self.stats = EpisodeStats::default();
        self.noise = (self.noise_factory)(self.config.simulation.seed);
        tracing::info!(seed = self.config.simulation.seed, "Episode reset");
    }

    /// Reset and build the configured potato level.
    pub fn load_level(&mut self) -> Result<PotatoLevel, DomainError> {
        self.reset();
        levels::build_potato(&mut self.world, self.config.difficulty, self.config.detailed)
    }

    /// Take every recorded result, oldest first.
    pub fn drain_results(&mut self) -> Vec<ResultRecord> {
        self.results.drain()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn agent_room(&self, agent: EntityId) -> Result<(RoomId, &Room), ActionError> {
        let label = self.world.label(agent);
        self.world
            .room_of(agent)
            .and_then(|id| self.world.room(id).map(|room| (id, room)))
            .ok_or_else(|| {
                ActionError::hard(format!("{} is not in any room.", label))
                    .with_context("actor", label)
            })
    }

    /// Readable ids the agent can refer to: everything in its room, nested
    /// or carried, and the connectors leading out of it.
    fn available_ids(&self, agent: EntityId, room_id: RoomId) -> Vec<String> {
        let mut ids: Vec<String> = self
            .world
            .entities()
            .filter_map(|entity| entity.id())
            .filter(|id| *id != agent && self.world.room_of(*id) == Some(room_id))
            .chain(
                self.world
                    .room(room_id)
                    .into_iter()
                    .flat_map(|room| room.connectors().iter().copied()),
            )
            .map(|id| self.world.label(id))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Resolve a readable id to an entity available to `agent`.
    pub fn resolve(&self, agent: EntityId, readable_id: &str) -> Result<EntityId, ActionError> {
        let (room_id, room) = self.agent_room(agent)?;
        let readable_id = readable_id.trim();
        let available = self.available_ids(agent, room_id);

        if let Some(id) = self.world.find_by_readable_id(readable_id) {
            if available.iter().any(|label| label == readable_id) {
                return Ok(id);
            }
        }

        Err(ActionError::hard(format!(
            "No object named '{}' is available in your current room.",
            readable_id
        ))
        .with_console(format!(
            "Lookup of '{}' failed in room '{}'.",
            readable_id,
            room.label()
        ))
        .with_hint("Use one of the ids listed in your observation.")
        .with_context("requested_id", readable_id)
        .with_context("room", room.label())
        .with_context("available_ids", available))
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Observation payload for `agent` at the configured depth.
    pub fn observe(&mut self, agent: EntityId) -> Result<Value, ActionError> {
        let depth = self.world.settings().observe_depth;
        let mut observation = Value::from(self.world.perceive(agent, depth, self.noise.as_mut())?);
        let inventory = self.world.inventory(agent)?;

        let (_, room) = self.agent_room(agent)?;
        let position = self
            .world
            .entity(agent)
            .and_then(|entity| entity.position())
            .unwrap_or_default();
        self.config.position_format.rewrite(&mut observation, room);
        tracing::debug!(
            agent = %self.world.label(agent),
            room = %room.label(),
            %depth,
            "Observation built"
        );

        Ok(json!({
            "you_are_in_room": {
                "name": room.name(),
                "your_pos": { "x": position.x, "y": position.y },
                "room_size": { "extend_x": room.extend_x(), "extend_y": room.extend_y() },
            },
            "your_inventory": inventory,
            "your_observation": observation,
        }))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run one tool call and record its outcome.
    pub fn execute(&mut self, agent: EntityId, command: &AgentCommand) -> ResultRecord {
        self.stats.tool_calls += 1;
        let (outcome, fallback) = match command {
            AgentCommand::MoveToPosition { x, y } => (
                self.world.move_to_position(agent, Position::new(*x, *y)),
                "moved successfully".to_string(),
            ),
            AgentCommand::MoveToField { field } => (
                self.move_to_field(agent, field),
                "moved successfully".to_string(),
            ),
            AgentCommand::MoveToObject { object_id } => (
                self.resolve(agent, object_id)
                    .and_then(|target| self.world.move_to_object(agent, target)),
                "moved successfully".to_string(),
            ),
            AgentCommand::TakeFrom { what_id, from_id } => {
                let fallback = if is_floor(from_id) {
                    format!("collected {}", what_id)
                } else {
                    format!("collected {} from {}", what_id, from_id)
                };
                (self.take_from(agent, what_id, from_id), fallback)
            }
            AgentCommand::DropTo { what_id, to_id } => {
                let fallback = if is_floor(to_id) {
                    format!("dropped {}", what_id)
                } else {
                    format!("dropped {} into {}", what_id, to_id)
                };
                (self.drop_to(agent, what_id, to_id), fallback)
            }
            AgentCommand::InteractWithObject {
                object_id,
                operator,
            } => (
                self.interact(agent, object_id, None, operator),
                format!("succeeded with {} {}", operator, object_id),
            ),
            AgentCommand::InteractWithObjectUsingItem {
                object_id,
                using_id,
                operator,
            } => (
                self.interact(agent, object_id, Some(using_id), operator),
                format!("succeeded with {} {}", operator, object_id),
            ),
        };
        self.record(command.tool_name(), &outcome, &fallback)
    }

    fn move_to_field(&mut self, agent: EntityId, field: &str) -> InteractionResult {
        let (_, room) = self.agent_room(agent)?;
        let format = self.config.position_format;
        let target = format.parse(field, room).map_err(|err| {
            ActionError::hard(err.to_string())
                .with_hint("Use a position in the same format as your observation.")
                .with_context("field", field)
                .with_context("format", format.to_string())
        })?;
        self.world.move_to_position(agent, target)
    }

    fn take_from(&mut self, agent: EntityId, what_id: &str, from_id: &str) -> InteractionResult {
        let item = self.resolve(agent, what_id)?;
        if is_floor(from_id) {
            return self.world.take(agent, item);
        }
        let container = self.resolve(agent, from_id)?;
        self.world.take_from(agent, item, container)
    }

    fn drop_to(&mut self, agent: EntityId, what_id: &str, to_id: &str) -> InteractionResult {
        let item = self.resolve(agent, what_id)?;
        if is_floor(to_id) {
            return self.world.drop(agent, item);
        }
        let container = self.resolve(agent, to_id)?;
        self.world.drop_into(agent, item, container)
    }

    fn interact(
        &mut self,
        agent: EntityId,
        object_id: &str,
        using_id: Option<&String>,
        operator: &str,
    ) -> InteractionResult {
        let operator = match using_id {
            Some(_) => commands::item_operator(operator)?,
            None => commands::plain_operator(operator)?,
        };
        let target = self.resolve(agent, object_id)?;
        let mut action = ActionTry::new(operator.action_type());
        if let Some(using_id) = using_id {
            action = action.with_item(self.resolve(agent, using_id)?);
        }
        self.world
            .interact(agent, target, &action, self.noise.as_mut())
    }

    /// Convert an outcome into a record, update the counters and buffer it.
    fn record(&mut self, tool: &str, outcome: &InteractionResult, fallback: &str) -> ResultRecord {
        let record = ResultRecord::from_outcome(outcome, fallback);
        let feedback = &record.feedback;
        match record.kind {
            ResultKind::Success => {
                tracing::debug!(tool, message = %feedback.agent_message, "Action succeeded");
            }
            ResultKind::ActionNotPossible => {
                self.stats.soft_errors += 1;
                tracing::warn!(
                    tool,
                    message = %feedback.console_message,
                    hint = ?feedback.hint,
                    "Action not possible"
                );
            }
            ResultKind::FormalError => {
                self.stats.hard_errors += 1;
                tracing::error!(
                    tool,
                    message = %feedback.console_message,
                    hint = ?feedback.hint,
                    "Formal error"
                );
            }
        }
        self.results.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Operator;
    use crate::noise::FixedNoise;
    use crate::presentation::PositionFormat;
    use roomsense_domain::{Entity, Room};

    /// Kitchen with a cook, a potato on the floor and a table.
    fn kitchen() -> (Session, EntityId) {
        let mut session = Session::with_noise(EngineConfig::default(), |_| FixedNoise(0));
        let world = session.world_mut();
        let room = world.add_room(Room::new("kitchen", 4.0, 4.0).with_light(1.0)).unwrap();
        let cook = world.add_entity(Entity::agent("cook")).unwrap();
        world.place(cook, room, Position::new(1.0, 1.0)).unwrap();
        let potato = world.add_entity(Entity::item("potato")).unwrap();
        world.place(potato, room, Position::new(1.5, 1.0)).unwrap();
        let table = world.add_entity(roomsense_domain::blueprints::table()).unwrap();
        world.place(table, room, Position::new(3.0, 3.0)).unwrap();
        (session, cook)
    }

    #[test]
    fn resolve_lists_available_ids_on_failure() {
        let (session, cook) = kitchen();
        assert_eq!(session.world().label(session.resolve(cook, "potato_3").unwrap()), "potato_3");

        let err = session.resolve(cook, "carrot_9").unwrap_err();
        assert!(err.is_hard());
        assert_eq!(
            err.to_string(),
            "No object named 'carrot_9' is available in your current room."
        );
        assert_eq!(
            err.feedback().context_value("available_ids"),
            Some(&json!(["potato_3", "table_4"]))
        );
        assert_eq!(err.feedback().context_value("room"), Some(&json!("kitchen_1")));
    }

    #[test]
    fn resolve_rejects_the_agent_itself() {
        let (session, cook) = kitchen();
        assert!(session.resolve(cook, "cook_2").is_err());
    }

    #[test]
    fn take_from_floor_and_drop_onto_table() {
        let (mut session, cook) = kitchen();

        let record = session.execute(cook, &AgentCommand::take_from("potato_3", "FLOOR"));
        assert_eq!(record.kind, ResultKind::Success);
        assert_eq!(record.feedback.agent_message, "took potato_3");

        let record = session.execute(cook, &AgentCommand::move_to_object("table_4"));
        assert_eq!(record.kind, ResultKind::Success);

        let record = session.execute(cook, &AgentCommand::drop_to("potato_3", "table_4"));
        assert_eq!(record.feedback.agent_message, "put potato_3 into table_4");

        assert_eq!(session.stats(), EpisodeStats { tool_calls: 3, soft_errors: 0, hard_errors: 0 });
        assert_eq!(session.drain_results().len(), 3);
        assert!(session.results().is_empty());
    }

    #[test]
    fn failures_are_counted_by_kind() {
        let (mut session, cook) = kitchen();

        let record = session.execute(cook, &AgentCommand::interact("potato_3", Operator::Open));
        assert_eq!(record.kind, ResultKind::FormalError);

        let record = session.execute(cook, &AgentCommand::MoveToPosition { x: 9.0, y: 1.0 });
        assert_eq!(record.kind, ResultKind::ActionNotPossible);

        let record = session.execute(
            cook,
            &AgentCommand::InteractWithObject {
                object_id: "table_4".into(),
                operator: "SMASH".into(),
            },
        );
        assert_eq!(record.kind, ResultKind::FormalError);
        assert_eq!(record.feedback.agent_message, "unknown operator for this action: SMASH");

        assert_eq!(session.stats(), EpisodeStats { tool_calls: 3, soft_errors: 1, hard_errors: 2 });
        assert!(session.results().has_formal_errors());
    }

    #[test]
    fn move_to_field_uses_the_board() {
        let (mut session, cook) = kitchen();
        session.config.position_format = PositionFormat::Chessboard;

        let record = session.execute(cook, &AgentCommand::MoveToField { field: "h1".into() });
        assert_eq!(record.kind, ResultKind::Success);
        let position = session.world().entity(cook).and_then(|e| e.position());
        assert_eq!(position, Some(Position::new(3.75, 3.75)));

        let record = session.execute(cook, &AgentCommand::MoveToField { field: "z9".into() });
        assert_eq!(record.kind, ResultKind::FormalError);
    }

    #[test]
    fn observe_builds_payload() {
        let (mut session, cook) = kitchen();
        let payload = session.observe(cook).unwrap();

        let room = &payload["you_are_in_room"];
        assert_eq!(room["name"], "kitchen");
        assert_eq!(room["your_pos"], json!({ "x": 1.0, "y": 1.0 }));
        assert_eq!(room["room_size"], json!({ "extend_x": 4.0, "extend_y": 4.0 }));
        assert_eq!(payload["your_inventory"], json!([]));

        let seen = payload["your_observation"].as_array().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0]["position"], "(1.5, 1)");
        assert_eq!(seen[1]["position"], "(3, 3)");
    }

    #[test]
    fn reset_clears_episode_state() {
        let (mut session, cook) = kitchen();
        session.execute(cook, &AgentCommand::take_from("potato_3", "floor"));
        session.reset();

        assert_eq!(session.world().entities().count(), 0);
        assert!(session.results().is_empty());
        assert_eq!(session.stats(), EpisodeStats::default());
    }
}
