//! Integration tests for the viewer layer.

use std::collections::HashMap;

use temple_core::config::TempleConfig;
use temple_core::setup::{create_zone_catalog, default_roster};
use temple_core::TempleSession;
use temple_events::{AgentId, AgentStatus, PresentationUpdate};
use temple_viz::agents::VisualAgent;
use temple_viz::TempleDriver;

fn driver(seed: u64) -> TempleDriver {
    let config = TempleConfig::default();
    let catalog = create_zone_catalog(config.movement.zone_padding).unwrap();
    let mut driver = TempleDriver::new(TempleSession::new(config, catalog, seed).unwrap());
    driver.session.populate(&default_roster()).unwrap();
    driver
}

fn visuals(driver: &TempleDriver) -> HashMap<AgentId, VisualAgent> {
    driver
        .session
        .agents()
        .map(|record| {
            let visual = VisualAgent::new(record.id().clone(), record.tier(), record.position());
            (record.id().clone(), visual)
        })
        .collect()
}

fn replay(visuals: &mut HashMap<AgentId, VisualAgent>, updates: &[PresentationUpdate]) {
    for update in updates {
        if let Some(visual) = visuals.get_mut(&update.agent_id) {
            visual.apply(update);
        }
    }
}

/// Replaying the update stream at frame-sized steps puts every sprite where
/// the controller says the agent is.
#[test]
fn test_replay_tracks_session_positions() {
    let mut driver = driver(21);
    let mut visuals = visuals(&driver);

    for _ in 0..(90_000 / 16) {
        driver.session.advance(16);
        replay(&mut visuals, &driver.drain());

        let now = driver.session.now_ms();
        for record in driver.session.agents() {
            let visual = &visuals[record.id()];
            assert_eq!(visual.position_at(now), record.position(), "{} drifted", record.id());
            assert_eq!(visual.is_moving, record.is_moving());
            assert_eq!(visual.status, record.status());
        }
    }
}

/// Loops follow the coordinator's instances, one per agent.
#[test]
fn test_replay_tracks_effects() {
    let mut driver = driver(22);
    let mut visuals = visuals(&driver);

    driver.session.pin_status(&AgentId::new("daji"), AgentStatus::Offline).unwrap();
    for _ in 0..60 {
        driver.session.advance(1_000);
        replay(&mut visuals, &driver.drain());
        for (id, visual) in &visuals {
            assert_eq!(visual.effect, driver.session.coordinator().effect(id));
        }
    }
    assert_eq!(visuals[&AgentId::new("daji")].opacity, 0.4);
}

/// Updates survive the JSON lines the headless runner writes.
#[test]
fn test_update_stream_round_trips_as_json_lines() {
    let mut driver = driver(23);
    driver.session.advance(30_000);
    let updates = driver.drain();
    assert!(!updates.is_empty());

    let lines: Vec<String> = updates
        .iter()
        .map(|u| serde_json::to_string(u).unwrap())
        .collect();
    let parsed: Vec<PresentationUpdate> = lines
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed, updates);
}
