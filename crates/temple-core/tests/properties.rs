//! Invariants that hold across long seeded runs of the default scene.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use temple_core::config::TempleConfig;
use temple_core::setup::{create_zone_catalog, default_roster};
use temple_core::TempleSession;
use temple_events::{AgentId, AgentStatus, EffectId, LoopKind, MotionPlan, PresentationUpdate};

fn default_session(seed: u64) -> (TempleSession, Arc<Mutex<Vec<PresentationUpdate>>>) {
    let config = TempleConfig::default();
    let catalog = create_zone_catalog(config.movement.zone_padding).unwrap();
    let mut session = TempleSession::new(config, catalog, seed).unwrap();

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    session.on_presentation_change(move |update| sink.lock().unwrap().push(update.clone()));

    session.populate(&default_roster()).unwrap();
    (session, updates)
}

#[test]
fn test_moving_iff_target_and_still_agents_in_zones() {
    let (mut session, _) = default_session(11);
    for _ in 0..(5 * 60 * 1_000 / 16) {
        session.advance(16);
        for record in session.agents() {
            assert_eq!(record.is_moving(), record.move_target().is_some());
            if !record.is_moving() {
                assert!(
                    session.catalog().contains(record.position()),
                    "{} rests outside every zone at {}",
                    record.id(),
                    record.position()
                );
            }
        }
    }
}

#[test]
fn test_moves_land_exactly_on_target() {
    let (mut session, updates) = default_session(12);
    session.advance(5 * 60 * 1_000);

    let mut in_flight: HashMap<AgentId, MotionPlan> = HashMap::new();
    let mut landings = 0;
    for update in updates.lock().unwrap().iter() {
        match (update.motion, in_flight.remove(&update.agent_id)) {
            (Some(plan), _) => {
                in_flight.insert(update.agent_id.clone(), plan);
            }
            (None, Some(plan)) => {
                assert_eq!(update.position, plan.to);
                assert_eq!(update.at_ms, plan.ends_at_ms());
                landings += 1;
            }
            (None, None) => {}
        }
    }
    assert!(landings > 0);
}

#[test]
fn test_no_move_starts_while_offline() {
    let (mut session, updates) = default_session(13);
    let ids: Vec<AgentId> = session.agents().map(|r| r.id().clone()).collect();

    // flip every agent between offline and idle at an awkward cadence
    for step in 0..4_000u64 {
        if step % 7 == 0 {
            let status = if step % 14 == 0 {
                AgentStatus::Offline
            } else {
                AgentStatus::Idle
            };
            for id in &ids {
                session.pin_status(id, status).unwrap();
            }
        }
        session.advance(37);
    }

    let mut was_moving: HashMap<AgentId, bool> = HashMap::new();
    let mut starts = 0;
    for update in updates.lock().unwrap().iter() {
        let before = was_moving.insert(update.agent_id.clone(), update.is_moving);
        if update.is_moving && before != Some(true) {
            starts += 1;
            assert_ne!(update.status, AgentStatus::Offline, "{} started offline", update.agent_id);
        }
    }
    assert!(starts > 0);
}

#[test]
fn test_one_effect_instance_per_agent() {
    let (mut session, updates) = default_session(14);
    session.advance(3 * 60 * 1_000);

    let mut current: HashMap<AgentId, Option<EffectId>> = HashMap::new();
    let mut retired: HashSet<EffectId> = HashSet::new();
    let mut owner: HashMap<EffectId, AgentId> = HashMap::new();

    for update in updates.lock().unwrap().iter() {
        let now = update.effect.map(|e| e.id);
        if let Some(id) = now {
            assert!(!retired.contains(&id), "effect {:?} came back after stopping", id);
            let first_owner = owner.entry(id).or_insert_with(|| update.agent_id.clone());
            assert_eq!(first_owner, &update.agent_id, "effect {:?} shared", id);
        }
        if let Some(Some(previous)) = current.insert(update.agent_id.clone(), now) {
            if Some(previous) != now {
                retired.insert(previous);
            }
        }
        if update.is_moving {
            assert_eq!(update.effect.map(|e| e.kind), Some(LoopKind::Walk));
        }
    }
}

#[test]
fn test_refresh_without_change_is_silent() {
    let (mut session, updates) = default_session(15);
    let id = AgentId::new("daji");

    session.pin_status(&id, AgentStatus::Error).unwrap();
    let emitted = session.updates_emitted();
    let effect = session.coordinator().effect(&id);

    session.force_status(&id, AgentStatus::Error).unwrap();
    session.pin_status(&id, AgentStatus::Error).unwrap();

    assert_eq!(session.updates_emitted(), emitted);
    assert_eq!(session.coordinator().effect(&id), effect);
    assert_eq!(updates.lock().unwrap().len() as u64, emitted);
}

#[test]
fn test_teardown_mid_run_leaves_others_running() {
    let (mut session, _) = default_session(16);
    session.advance(20_000);

    let gone = AgentId::new("xiaosen");
    session.teardown(&gone).unwrap();
    session.advance(60_000);

    assert!(session.agent(&gone).is_none());
    assert_eq!(session.agents().count(), 16);
    assert!(session.snapshot().agent("xiaosen").is_none());
}
