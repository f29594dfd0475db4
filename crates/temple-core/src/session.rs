//! Session Controller
//!
//! Owns the agent registry, the virtual clock and its timer queue, the random
//! source, and the animation coordinator. Every timer callback runs through
//! here on a single thread.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use uuid::Uuid;

use temple_events::{
    generate_snapshot_id, AgentId, AgentSnapshot, AgentStatus, MotionPlan, Point,
    PresentationUpdate, SceneSnapshot,
};

use crate::agent::{AgentRecord, RosterEntry};
use crate::config::{ConfigError, TempleConfig};
use crate::coordinator::AnimationCoordinator;
use crate::motion::{MotionError, MotionExecutor};
use crate::registry::{AgentEntry, AgentRegistry, AgentTasks, TimerEvent};
use crate::scheduler::{MovementScheduler, WanderOutcome};
use crate::setup::layout_positions;
use crate::status::StatusSimulator;
use crate::timers::{Millis, TimerQueue};
use crate::zone::{ZoneCatalog, ZoneError};

/// Callback receiving presentation changes.
pub type PresentationListener = Box<dyn FnMut(&PresentationUpdate) + Send + Sync>;

/// Errors returned to hosts driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown agent `{0}`")]
    UnknownAgent(AgentId),
    #[error("agent `{0}` is already registered")]
    DuplicateAgent(AgentId),
    #[error("start position {position} of agent `{agent}` is not finite")]
    InvalidPosition { agent: AgentId, position: Point },
    #[error(transparent)]
    Motion(#[from] MotionError),
    #[error(transparent)]
    Zone(#[from] ZoneError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct TempleSession {
    id: Uuid,
    config: TempleConfig,
    catalog: ZoneCatalog,
    registry: AgentRegistry,
    timers: TimerQueue<TimerEvent>,
    scheduler: MovementScheduler,
    executor: MotionExecutor,
    simulator: StatusSimulator,
    coordinator: AnimationCoordinator,
    listeners: Vec<PresentationListener>,
    rng: SmallRng,
    now_ms: Millis,
    snapshot_seq: u64,
    updates_emitted: u64,
}

impl TempleSession {
    /// Creates an empty session at time zero with a seeded random source.
    /// The status tick is armed right away.
    pub fn new(config: TempleConfig, catalog: ZoneCatalog, seed: u64) -> Result<Self, SessionError> {
        Self::with_rng(config, catalog, SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(
        config: TempleConfig,
        catalog: ZoneCatalog,
        rng: SmallRng,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let simulator = StatusSimulator::new(&config.status)?;
        let mut timers = TimerQueue::new();
        timers.arm(simulator.interval_ms(), TimerEvent::StatusTick);

        let id = Uuid::new_v4();
        tracing::info!(
            "Session {} created: {} zones, padding {}",
            id,
            catalog.zones().len(),
            catalog.padding()
        );

        Ok(Self {
            id,
            scheduler: MovementScheduler::new(config.movement.clone()),
            executor: MotionExecutor::new(config.motion.clone()),
            simulator,
            config,
            catalog,
            registry: AgentRegistry::new(),
            timers,
            coordinator: AnimationCoordinator::new(),
            listeners: Vec::new(),
            rng,
            now_ms: 0,
            snapshot_seq: 0,
            updates_emitted: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &TempleConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ZoneCatalog {
        &self.catalog
    }

    pub fn now_ms(&self) -> Millis {
        self.now_ms
    }

    /// Number of presentation updates published so far.
    pub fn updates_emitted(&self) -> u64 {
        self.updates_emitted
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // --- Lifecycle ---------------------------------------------------------

    /// Registers an agent standing at `start` and arms its wander loop. It
    /// takes part in the next status tick.
    pub fn initialize(
        &mut self,
        profile: RosterEntry,
        start: Point,
    ) -> Result<&AgentRecord, SessionError> {
        let id = profile.id.clone();
        if !start.x.is_finite() || !start.y.is_finite() {
            return Err(SessionError::InvalidPosition {
                agent: id,
                position: start,
            });
        }
        let speed = self.config.speeds.speed_for(profile.tier);
        let record = AgentRecord::new(id.clone(), profile.tier, speed, start);
        let entry = AgentEntry {
            profile,
            record,
            tasks: AgentTasks::default(),
        };
        if self.registry.insert(entry).is_err() {
            return Err(SessionError::DuplicateAgent(id));
        }
        tracing::info!("Agent {} joined at {}", id, start);

        self.schedule_next(&id);
        self.refresh(&id);
        self.record(&id)
    }

    /// Initializes every roster entry at its layout position. Returns how
    /// many agents were added.
    pub fn populate(&mut self, roster: &[RosterEntry]) -> Result<usize, SessionError> {
        let positions = layout_positions(roster, &self.catalog);
        for (profile, start) in roster.iter().zip(positions) {
            self.initialize(profile.clone(), start)?;
        }
        Ok(roster.len())
    }

    /// Removes an agent, cancelling every timer it owns and stopping its
    /// effects.
    pub fn teardown(&mut self, id: &AgentId) -> Option<AgentRecord> {
        let mut entry = self.registry.remove(id)?;
        let cancelled = entry.tasks.release(&mut self.timers);
        self.coordinator.release(id);
        tracing::info!("Agent {} left ({} timers cancelled)", id, cancelled);
        Some(entry.record)
    }

    // --- Host controls -----------------------------------------------------

    /// Sets an agent's status right away. The status simulator may replace
    /// it at its next tick unless the agent is pinned.
    pub fn force_status(&mut self, id: &AgentId, status: AgentStatus) -> Result<(), SessionError> {
        let entry = self.entry_mut(id)?;
        entry.record.status = status;
        tracing::debug!("{} forced to {}", id, status);
        self.refresh(id);
        Ok(())
    }

    /// Forces a status and keeps the simulator away from the agent.
    pub fn pin_status(&mut self, id: &AgentId, status: AgentStatus) -> Result<(), SessionError> {
        self.entry_mut(id)?.record.pinned = true;
        self.force_status(id, status)
    }

    /// Hands the agent back to the status simulator.
    pub fn unpin_status(&mut self, id: &AgentId) -> Result<(), SessionError> {
        self.entry_mut(id)?.record.pinned = false;
        Ok(())
    }

    /// Registers a callback for every presentation change.
    pub fn on_presentation_change<F>(&mut self, listener: F)
    where
        F: FnMut(&PresentationUpdate) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// One wander attempt for `id`, outside its regular loop.
    pub fn attempt_move(&mut self, id: &AgentId) -> Result<WanderOutcome, SessionError> {
        let entry = self.entry(id)?;
        if let Some(skipped) = self.scheduler.precheck(&entry.record) {
            tracing::debug!("{} wander skipped: {:?}", id, skipped);
            return Ok(skipped);
        }
        let position = entry.record.position();
        let Some((target, kind)) = self
            .scheduler
            .choose_destination(position, &self.catalog, &mut self.rng)
        else {
            tracing::debug!("{} has no zone to wander to", id);
            return Ok(WanderOutcome::NoZone);
        };

        let plan = self.begin_move(id, target)?;
        tracing::debug!(
            "{} wanders ({:?}) {} -> {} in {} ms",
            id,
            kind,
            plan.from,
            plan.to,
            plan.duration_ms
        );
        Ok(WanderOutcome::Started {
            target,
            duration_ms: plan.duration_ms,
            kind,
        })
    }

    /// Starts a move toward `target`. Zero-length moves land before this
    /// returns.
    pub fn begin_move(&mut self, id: &AgentId, target: Point) -> Result<MotionPlan, SessionError> {
        let now = self.now_ms;
        let entry = self.registry.get_mut(id).ok_or_else(|| unknown(id))?;
        let plan = self.executor.begin(&mut entry.record, target, now)?;
        self.refresh(id);

        if plan.duration_ms == 0 {
            self.complete_move(id);
        } else {
            let handle = self
                .timers
                .arm(plan.ends_at_ms(), TimerEvent::MoveComplete(id.clone()));
            if let Some(entry) = self.registry.get_mut(id) {
                entry.tasks.completion = Some(handle);
            }
        }
        Ok(plan)
    }

    // --- Time --------------------------------------------------------------

    /// Runs every timer due within the next `delta_ms`, then moves the clock
    /// to the end of the step and samples moves in flight.
    pub fn advance(&mut self, delta_ms: Millis) {
        let end = self.now_ms.saturating_add(delta_ms);
        while let Some((due, _, event)) = self.timers.pop_due(end) {
            self.now_ms = self.now_ms.max(due);
            self.dispatch(event);
        }
        self.now_ms = end;

        let now = self.now_ms;
        for entry in self.registry.iter_mut() {
            self.executor.sample(&mut entry.record, now);
        }
    }

    /// Advances to an absolute session time. Earlier times are ignored.
    pub fn advance_to(&mut self, at_ms: Millis) {
        if at_ms > self.now_ms {
            self.advance(at_ms - self.now_ms);
        }
    }

    /// Due time of the agent's pending wander attempt.
    pub fn next_wander_at(&self, id: &AgentId) -> Option<Millis> {
        let handle = self.registry.get(id)?.tasks.wander?;
        self.timers.due_at(handle)
    }

    /// Number of armed timers, the status tick included.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // --- Queries -----------------------------------------------------------

    pub fn agent(&self, id: &AgentId) -> Option<&AgentRecord> {
        self.registry.get(id).map(|e| &e.record)
    }

    pub fn profile(&self, id: &AgentId) -> Option<&RosterEntry> {
        self.registry.get(id).map(|e| &e.profile)
    }

    /// Every record, in id order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentRecord> {
        self.registry.iter().map(|e| &e.record)
    }

    pub fn coordinator(&self) -> &AnimationCoordinator {
        &self.coordinator
    }

    /// Captures every agent at the current time.
    pub fn snapshot(&mut self) -> SceneSnapshot {
        self.snapshot_seq += 1;
        let agents = self
            .registry
            .iter()
            .map(|entry| {
                let record = &entry.record;
                AgentSnapshot {
                    agent_id: record.id().clone(),
                    name: entry.profile.name.clone(),
                    tier: record.tier(),
                    status: record.status(),
                    position: record.position(),
                    is_moving: record.is_moving(),
                    move_target: record.move_target(),
                    pinned: record.is_pinned(),
                    effect: self.coordinator.effect(record.id()).map(|e| e.kind),
                    zone: self
                        .catalog
                        .zone_containing(record.position())
                        .map(|z| z.name.clone()),
                }
            })
            .collect();

        SceneSnapshot {
            snapshot_id: generate_snapshot_id(self.snapshot_seq),
            session_id: self.id,
            at_ms: self.now_ms,
            agents,
        }
    }

    // --- Timer callbacks ---------------------------------------------------

    fn dispatch(&mut self, event: TimerEvent) {
        tracing::trace!("[{} ms] timer {:?}", self.now_ms, event);
        match event {
            TimerEvent::Wander(id) => {
                let Some(entry) = self.registry.get_mut(&id) else {
                    return;
                };
                entry.tasks.wander = None;
                // Outcome only matters to direct callers; the loop re-arms regardless.
                let _ = self.attempt_move(&id);
                self.schedule_next(&id);
            }
            TimerEvent::MoveComplete(id) => {
                let Some(entry) = self.registry.get_mut(&id) else {
                    return;
                };
                entry.tasks.completion = None;
                self.complete_move(&id);
            }
            TimerEvent::Settle(id) => {
                let Some(entry) = self.registry.get_mut(&id) else {
                    return;
                };
                entry.tasks.settle = None;
                if self.executor.should_activate(&entry.record, &mut self.rng) {
                    entry.record.status = AgentStatus::Active;
                    tracing::debug!("{} lights up after landing", id);
                    self.refresh(&id);
                }
            }
            TimerEvent::StatusTick => {
                let touched = self.simulator.tick(&mut self.registry, &mut self.rng);
                for id in &touched {
                    self.refresh(id);
                }
                self.timers.arm(
                    self.now_ms + self.simulator.interval_ms(),
                    TimerEvent::StatusTick,
                );
            }
        }
    }

    fn schedule_next(&mut self, id: &AgentId) {
        let delay = self.scheduler.next_delay(&mut self.rng);
        let due = self.now_ms + delay;
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        if let Some(stale) = entry.tasks.wander.take() {
            self.timers.cancel(stale);
        }
        entry.tasks.wander = Some(self.timers.arm(due, TimerEvent::Wander(id.clone())));
    }

    fn complete_move(&mut self, id: &AgentId) {
        let settle_at = self.now_ms + self.executor.config().settle_delay_ms;
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        if self.executor.complete(&mut entry.record).is_none() {
            return;
        }
        if let Some(pending) = entry.tasks.settle.take() {
            self.timers.cancel(pending);
        }
        entry.tasks.settle = Some(self.timers.arm(settle_at, TimerEvent::Settle(id.clone())));
        tracing::debug!("{} landed at {}", id, entry.record.position());
        self.refresh(id);
    }

    fn refresh(&mut self, id: &AgentId) {
        let Some(entry) = self.registry.get(id) else {
            return;
        };
        if let Some(update) = self.coordinator.refresh(&entry.record, self.now_ms) {
            self.updates_emitted += 1;
            for listener in self.listeners.iter_mut() {
                listener(&update);
            }
        }
    }

    fn record(&self, id: &AgentId) -> Result<&AgentRecord, SessionError> {
        self.agent(id).ok_or_else(|| unknown(id))
    }

    fn entry(&self, id: &AgentId) -> Result<&AgentEntry, SessionError> {
        self.registry.get(id).ok_or_else(|| unknown(id))
    }

    fn entry_mut(&mut self, id: &AgentId) -> Result<&mut AgentEntry, SessionError> {
        self.registry.get_mut(id).ok_or_else(|| unknown(id))
    }
}

fn unknown(id: &AgentId) -> SessionError {
    SessionError::UnknownAgent(id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;
    use std::sync::{Arc, Mutex};
    use temple_events::{AgentTier, LoopKind};

    fn session() -> TempleSession {
        let catalog =
            ZoneCatalog::new(vec![Zone::new("hall", "Hall", 50.0, 50.0, 200.0, 200.0)], 30.0)
                .unwrap();
        TempleSession::new(TempleConfig::default(), catalog, 7).unwrap()
    }

    fn lieutenant(id: &str) -> RosterEntry {
        RosterEntry::new(id, id, AgentTier::Lieutenant)
    }

    #[test]
    fn test_initialize_rejects_duplicate() {
        let mut session = session();
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        let err = session
            .initialize(lieutenant("daji"), Point::new(120.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, SessionError::DuplicateAgent(_)));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_initialize_rejects_nan_start() {
        let mut session = session();
        let err = session
            .initialize(lieutenant("daji"), Point::new(f32::NAN, 0.0))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidPosition { .. }));
        assert!(session.is_empty());
    }

    #[test]
    fn test_initialize_arms_wander_loop() {
        let mut session = session();
        let id = AgentId::new("daji");
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        let due = session.next_wander_at(&id).unwrap();
        assert!((5_000..=12_000).contains(&due));
        // wander plus the status tick
        assert_eq!(session.pending_timers(), 2);
    }

    #[test]
    fn test_unknown_agent_errors() {
        let mut session = session();
        let ghost = AgentId::new("ghost");
        assert!(matches!(
            session.force_status(&ghost, AgentStatus::Error),
            Err(SessionError::UnknownAgent(_))
        ));
        assert!(session.attempt_move(&ghost).is_err());
        assert!(session.begin_move(&ghost, Point::new(0.0, 0.0)).is_err());
        assert!(session.teardown(&ghost).is_none());
    }

    #[test]
    fn test_listener_sees_walk_then_rest() {
        let mut session = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.on_presentation_change(move |update| {
            sink.lock().unwrap().push(update.clone());
        });

        let id = AgentId::new("daji");
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        session.begin_move(&id, Point::new(150.0, 100.0)).unwrap();
        session.advance(500);

        let seen = seen.lock().unwrap();
        let effects: Vec<Option<LoopKind>> =
            seen.iter().map(|u| u.effect.map(|e| e.kind)).collect();
        assert_eq!(effects, vec![None, Some(LoopKind::Walk), None]);
        assert_eq!(seen[1].motion.map(|m| m.duration_ms), Some(500));
        assert_eq!(seen[2].at_ms, 500);
        assert_eq!(seen[2].position, Point::new(150.0, 100.0));
    }

    #[test]
    fn test_zero_distance_move_lands_immediately() {
        let mut session = session();
        let id = AgentId::new("daji");
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        let plan = session.begin_move(&id, Point::new(100.0, 100.0)).unwrap();
        assert_eq!(plan.duration_ms, 0);
        assert!(!session.agent(&id).unwrap().is_moving());
    }

    #[test]
    fn test_teardown_cancels_timers() {
        let mut session = session();
        let id = AgentId::new("daji");
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        session.begin_move(&id, Point::new(200.0, 200.0)).unwrap();
        assert_eq!(session.pending_timers(), 3);

        let record = session.teardown(&id).unwrap();
        assert!(record.is_moving());
        assert_eq!(session.pending_timers(), 1);
        assert!(session.coordinator().effect(&id).is_none());

        // nothing left to fire for the agent
        session.advance(60_000);
        assert!(session.agent(&id).is_none());
    }

    #[test]
    fn test_pin_survives_status_ticks() {
        let mut session = session();
        let id = AgentId::new("daji");
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        session.pin_status(&id, AgentStatus::Error).unwrap();

        for _ in 0..10 {
            session.advance(3_000);
            assert_eq!(session.agent(&id).unwrap().status(), AgentStatus::Error);
        }
        session.unpin_status(&id).unwrap();
        assert!(!session.agent(&id).unwrap().is_pinned());
    }

    #[test]
    fn test_snapshot_reports_zone_and_effect() {
        let mut session = session();
        let id = AgentId::new("daji");
        session.initialize(lieutenant("daji"), Point::new(100.0, 100.0)).unwrap();
        session.force_status(&id, AgentStatus::Thinking).unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.snapshot_id, "snap_000001");
        assert_eq!(snapshot.session_id, session.id());
        let agent = snapshot.agent("daji").unwrap();
        assert_eq!(agent.zone.as_deref(), Some("hall"));
        assert_eq!(agent.effect, Some(LoopKind::Breathe));
        assert_eq!(session.snapshot().snapshot_id, "snap_000002");
    }
}
