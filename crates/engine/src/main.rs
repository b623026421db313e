//! Roomsense Engine - scripted walkthrough of the potato level.

use std::path::{Path, PathBuf};

use roomsense_engine::{AgentCommand, EngineConfig, Operator, Session, FLOOR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    let dotenv = load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomsense_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The subscriber reads RUST_LOG from the env files, so report them now
    for (path, outcome) in dotenv {
        match outcome {
            Ok(_) => tracing::debug!(path = %path.display(), "Loaded env file"),
            Err(error) => tracing::debug!(path = %path.display(), %error, "Failed to load env file"),
        }
    }

    let config = EngineConfig::from_env();
    tracing::info!(
        difficulty = %config.difficulty,
        mode = %config.simulation.perception_mode,
        format = %config.position_format,
        "Starting Roomsense demo"
    );

    let mut session = Session::new(config);
    let level = session.load_level()?;
    tracing::info!(instruction = %level.instruction, "Level loaded");

    let world = session.world();
    let potato = world.label(level.potato);
    let table = world.label(level.table);
    let key = world
        .find_by_name("key")
        .ok_or_else(|| anyhow::anyhow!("level has no key"))?;
    let key_source = world
        .entity(key)
        .and_then(|key| key.parent())
        .map(|id| world.label(id))
        .unwrap_or_else(|| FLOOR.to_string());
    let key = world.label(key);
    let door = world
        .find_by_name("door")
        .map(|id| world.label(id))
        .ok_or_else(|| anyhow::anyhow!("level has no door"))?;
    let chest = world
        .entity(level.potato)
        .and_then(|potato| potato.parent())
        .and_then(|id| world.entity(id))
        .ok_or_else(|| anyhow::anyhow!("potato is not in a container"))?;
    let chest_locked = chest.is_locked() == Some(true);
    let chest = chest.label().to_string();

    let mut script = Vec::new();
    if chest_locked {
        script.push(AgentCommand::move_to_object(&key));
        script.push(AgentCommand::take_from(&key, &key_source));
    }
    script.extend([
        AgentCommand::move_to_object(&door),
        AgentCommand::interact(&door, Operator::LookThrough),
        AgentCommand::interact(&door, Operator::GoThrough),
        AgentCommand::move_to_object(&potato),
    ]);
    if chest_locked {
        script.push(AgentCommand::interact_using(&chest, &key, Operator::Unlock));
        script.push(AgentCommand::interact(&chest, Operator::Open));
    }
    script.extend([
        AgentCommand::take_from(&potato, &chest),
        AgentCommand::move_to_object(&door),
        AgentCommand::interact(&door, Operator::GoThrough),
        AgentCommand::move_to_object(&table),
        AgentCommand::drop_to(&potato, &table),
    ]);

    for command in &script {
        match session.observe(level.agent) {
            Ok(observation) => {
                tracing::debug!(observation = %observation, "Agent observes");
            }
            Err(err) => tracing::warn!(error = %err, "Observation failed"),
        }
        let record = session.execute(level.agent, command);
        println!("{} -> {}", command.tool_name(), record.agent_text());
    }

    let stats = session.stats();
    let won = level.is_success(session.world());
    tracing::info!(
        won,
        tool_calls = stats.tool_calls,
        soft_errors = stats.soft_errors,
        hard_errors = stats.hard_errors,
        "Episode finished"
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn load_dotenv_from_repo_root() -> Vec<(PathBuf, Result<(), dotenvy::Error>)> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    load_env_files(&repo_root)
}

/// Load `.env.local` then `.env` from `dir`, returning the outcome for every
/// file that exists.
fn load_env_files(dir: &Path) -> Vec<(PathBuf, Result<(), dotenvy::Error>)> {
    // Earlier files win since dotenvy never overrides a set variable
    [".env.local", ".env"]
        .into_iter()
        .map(|filename| dir.join(filename))
        .filter(|path| path.exists())
        .map(|path| {
            let outcome = dotenvy::from_path(&path);
            (path, outcome)
        })
        .collect()
}
