//! What an agent sees over the course of an episode.

use super::*;
use crate::commands::{AgentCommand, Operator, FLOOR};
use crate::config::EngineConfig;
use crate::levels::Difficulty;
use crate::presentation::PositionFormat;

#[test]
fn first_observation_lists_the_main_room() {
    let (mut session, level) = session_with_config(all_seeing(Difficulty::Easy));
    let observation = session.observe(level.agent).unwrap();

    let room = &observation["you_are_in_room"];
    assert_eq!(room["name"], "main");
    assert_eq!(room["your_pos"]["x"], 0.0);

    let key = observed_at(&observation, "(3, 1)");
    assert_eq!(key["name"], "key");
    assert_eq!(key["id"], "key_4");

    let table = observed_at(&observation, "(0, 3)");
    assert_eq!(table["contents_count"], "empty");

    let door = observed_at(&observation, "(4, 4)");
    assert_eq!(door["state"], "open");
    assert_eq!(door["lock_state"], "unlocked");

    let seen = observation["your_observation"].as_array().unwrap();
    assert!(seen.iter().all(|e| e["name"] != "tron"));
    assert!(seen.iter().all(|e| e["name"] != "potato"));
}

#[test]
fn chessboard_positions_in_observation() {
    let config = all_seeing(Difficulty::Easy).with_position_format(PositionFormat::Chessboard);
    let (mut session, level) = session_with_config(config);
    let observation = session.observe(level.agent).unwrap();

    assert_eq!(observed_at(&observation, "g6")["name"], "key");
    assert_eq!(observed_at(&observation, "a2")["name"], "table");
    assert_eq!(observed_at(&observation, "h1")["name"], "door");
    // The agent's own position stays in meters
    assert_eq!(observation["you_are_in_room"]["your_pos"]["y"], 0.0);

    session.execute(level.agent, &AgentCommand::MoveToField { field: "g6".into() });
    let position = session.world().entity(level.agent).and_then(|e| e.position());
    assert_eq!(position, Some(roomsense_domain::Position::new(3.25, 1.25)));
}

#[test]
fn closed_chest_hides_the_potato_until_opened() {
    let (mut session, level) = session_with_config(all_seeing(Difficulty::Medium));
    let agent = level.agent;
    let (door, key, chest) = (
        readable(&session, "door"),
        readable(&session, "key"),
        readable(&session, "chest"),
    );

    session.execute(agent, &AgentCommand::move_to_object(&key));
    session.execute(agent, &AgentCommand::take_from(&key, FLOOR));
    session.execute(agent, &AgentCommand::move_to_object(&door));
    session.execute(agent, &AgentCommand::interact(&door, Operator::GoThrough));

    let observation = session.observe(agent).unwrap();
    let shelf = observed_at(&observation, "(0, 2)");
    assert_eq!(shelf["name"], "shelf");
    let nested = &shelf["contents"][0];
    assert_eq!(nested["name"], "chest");
    assert_eq!(nested["state"], "closed");
    assert_eq!(nested["lock_state"], "locked");
    assert_eq!(nested["contents"], serde_json::json!(["unknown"]));

    session.execute(agent, &AgentCommand::move_to_object(&chest));
    session.execute(agent, &AgentCommand::interact_using(&chest, &key, Operator::Unlock));
    session.execute(agent, &AgentCommand::interact(&chest, Operator::Open));
    assert_eq!(session.stats().soft_errors + session.stats().hard_errors, 0);

    let observation = session.observe(agent).unwrap();
    let nested = &observed_at(&observation, "(0, 2)")["contents"][0];
    assert_eq!(nested["state"], "open");
    assert_eq!(nested["contents"][0]["name"], "potato");
}

#[test]
fn look_through_shows_the_far_room() {
    let (mut session, level) = session_with_config(all_seeing(Difficulty::Easy));
    let door = readable(&session, "door");

    session.execute(level.agent, &AgentCommand::move_to_object(&door));
    let record = session.execute(level.agent, &AgentCommand::interact(&door, Operator::LookThrough));
    let message = record.feedback.agent_message;
    assert!(message.starts_with("Through door_6 you see into chamber_2: "), "{}", message);
    assert!(message.contains("\"shelf\""));

    // Looking does not move the agent
    let main = session.world().find_room_by_readable_id("main_1");
    assert_eq!(session.world().room_of(level.agent), main);
}

#[test]
fn sensory_observation_depends_on_distance() {
    let config = EngineConfig::default().with_difficulty(Difficulty::Hard);
    let (mut session, level) = session_with_config(config);
    let table = readable(&session, "table");

    // Touch does not reach four meters
    let far = session.observe(level.agent).unwrap();
    assert!(observed_at(&far, "(0, 4)").get("material").is_none());

    session.execute(level.agent, &AgentCommand::move_to_object(&table));
    let near = session.observe(level.agent).unwrap();
    assert_eq!(observed_at(&near, "(0, 4)")["name"], "table");
}
