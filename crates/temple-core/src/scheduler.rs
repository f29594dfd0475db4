//! Movement Scheduler
//!
//! Decides when each agent next tries to wander and where it goes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use temple_events::{AgentStatus, Point};

use crate::agent::AgentRecord;
use crate::config::MovementConfig;
use crate::timers::Millis;
use crate::zone::ZoneCatalog;

/// How a wander destination was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WanderKind {
    /// Inside the zone the agent stands in
    Local,
    /// Inside any zone of the catalog
    Roam,
}

/// Result of one wander attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WanderOutcome {
    Started {
        target: Point,
        duration_ms: Millis,
        kind: WanderKind,
    },
    SkippedMoving,
    SkippedOffline,
    /// The catalog has no zone to wander to.
    NoZone,
}

impl WanderOutcome {
    pub fn started(&self) -> bool {
        matches!(self, WanderOutcome::Started { .. })
    }
}

#[derive(Debug, Clone)]
pub struct MovementScheduler {
    config: MovementConfig,
}

impl MovementScheduler {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Wait before the next wander attempt, uniform over the configured
    /// interval (both ends included).
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Millis {
        rng.gen_range(self.config.min_interval_ms..=self.config.max_interval_ms)
    }

    /// Why `record` may not start a wander right now, if anything.
    pub fn precheck(&self, record: &AgentRecord) -> Option<WanderOutcome> {
        if record.is_moving() {
            Some(WanderOutcome::SkippedMoving)
        } else if record.status() == AgentStatus::Offline {
            Some(WanderOutcome::SkippedOffline)
        } else {
            None
        }
    }

    /// Picks a destination for an agent standing at `position`.
    ///
    /// Mostly stays in the agent's own zone (the largest zone when it stands
    /// outside all of them), otherwise roams to a uniformly chosen zone.
    pub fn choose_destination<R: Rng + ?Sized>(
        &self,
        position: Point,
        catalog: &ZoneCatalog,
        rng: &mut R,
    ) -> Option<(Point, WanderKind)> {
        if catalog.is_empty() {
            return None;
        }
        let (zone, kind) = if rng.gen_bool(self.config.local_zone_probability) {
            (catalog.home_zone(position)?, WanderKind::Local)
        } else {
            (catalog.random_zone(rng)?, WanderKind::Roam)
        };
        Some((catalog.sample(zone, rng), kind))
    }
}
