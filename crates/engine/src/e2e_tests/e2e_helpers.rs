use roomsense_domain::{EntityId, PerceptionMode, ResultKind, ResultRecord, SimulationSettings};
use serde_json::Value;

use crate::commands::AgentCommand;
use crate::config::EngineConfig;
use crate::levels::{Difficulty, PotatoLevel};
use crate::noise::FixedNoise;
use crate::session::Session;

/// Session with the given level loaded and noise pinned to zero.
pub fn session_with_level(difficulty: Difficulty) -> (Session, PotatoLevel) {
    session_with_config(EngineConfig::default().with_difficulty(difficulty))
}

pub fn session_with_config(config: EngineConfig) -> (Session, PotatoLevel) {
    let mut session = Session::with_noise(config, |_| FixedNoise(0));
    let level = session.load_level().expect("level should build");
    (session, level)
}

/// Defaults with every datum disclosed, for asserting on structure.
pub fn all_seeing(difficulty: Difficulty) -> EngineConfig {
    EngineConfig::default()
        .with_difficulty(difficulty)
        .with_simulation(SimulationSettings::default().with_perception_mode(PerceptionMode::All))
}

/// Readable id of the first entity named `name`.
pub fn readable(session: &Session, name: &str) -> String {
    let id = session
        .world()
        .find_by_name(name)
        .unwrap_or_else(|| panic!("no entity named {}", name));
    session.world().label(id)
}

/// Run `command`, asserting it succeeds.
pub fn expect_success(session: &mut Session, agent: EntityId, command: AgentCommand) -> ResultRecord {
    let record = session.execute(agent, &command);
    assert_eq!(
        record.kind,
        ResultKind::Success,
        "{} failed: {}",
        command.tool_name(),
        record.agent_text()
    );
    record
}

/// Run `command`, asserting it fails with `kind`.
pub fn expect_failure(
    session: &mut Session,
    agent: EntityId,
    command: AgentCommand,
    kind: ResultKind,
) -> ResultRecord {
    let record = session.execute(agent, &command);
    assert_eq!(record.kind, kind, "{}: {}", command.tool_name(), record.agent_text());
    record
}

/// Entry of the current observation whose position renders as `position`.
pub fn observed_at(observation: &Value, position: &str) -> Value {
    observation["your_observation"]
        .as_array()
        .and_then(|seen| seen.iter().find(|e| e["position"] == position))
        .cloned()
        .unwrap_or_else(|| panic!("nothing observed at {}", position))
}
