//! Motion Executor
//!
//! Straight-line moves at tier speed, landing exactly on target, and the
//! settle roll that may light an agent up after it lands.

use rand::Rng;
use thiserror::Error;

use temple_events::{AgentId, AgentStatus, MotionPlan, Point};

use crate::agent::AgentRecord;
use crate::config::MotionConfig;
use crate::timers::Millis;

/// Reasons a move cannot start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("agent `{0}` is already moving")]
    AlreadyMoving(AgentId),
    #[error("agent `{0}` is offline")]
    Offline(AgentId),
    #[error("move target {0} is not a finite point")]
    NonFiniteTarget(Point),
}

/// Travel time in whole milliseconds, rounded up. Zero for zero distance.
pub fn travel_time_ms(from: Point, to: Point, speed: f32) -> Millis {
    let distance = from.distance(to) as f64;
    if distance == 0.0 {
        return 0;
    }
    (distance / speed as f64 * 1000.0).ceil() as Millis
}

#[derive(Debug, Clone)]
pub struct MotionExecutor {
    config: MotionConfig,
}

impl MotionExecutor {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Starts a move toward `target` at `now`. The record is left untouched
    /// on error.
    pub fn begin(
        &self,
        record: &mut AgentRecord,
        target: Point,
        now: Millis,
    ) -> Result<MotionPlan, MotionError> {
        if !target.x.is_finite() || !target.y.is_finite() {
            return Err(MotionError::NonFiniteTarget(target));
        }
        if record.is_moving() {
            return Err(MotionError::AlreadyMoving(record.id().clone()));
        }
        if record.status() == AgentStatus::Offline {
            return Err(MotionError::Offline(record.id().clone()));
        }

        let plan = MotionPlan {
            from: record.position,
            to: target,
            started_at_ms: now,
            duration_ms: travel_time_ms(record.position, target, record.speed()),
        };
        record.motion = Some(plan);
        Ok(plan)
    }

    /// Moves the record along its plan to where it is at `now`.
    pub fn sample(&self, record: &mut AgentRecord, now: Millis) {
        if let Some(plan) = record.motion {
            record.position = plan.position_at(now);
        }
    }

    /// Lands the move in flight. Returns the finished plan, or `None` when
    /// the agent was not moving.
    pub fn complete(&self, record: &mut AgentRecord) -> Option<MotionPlan> {
        let plan = record.motion.take()?;
        record.position = plan.to;
        Some(plan)
    }

    /// Whether a settled agent should switch to `active`. Only agents that
    /// are standing still, not pinned, and neither offline nor in error get a
    /// roll.
    pub fn should_activate<R: Rng + ?Sized>(&self, record: &AgentRecord, rng: &mut R) -> bool {
        let eligible = !record.is_moving()
            && !record.is_pinned()
            && !matches!(record.status(), AgentStatus::Offline | AgentStatus::Error);
        eligible && rng.gen_bool(self.config.settle_activation_probability)
    }
}
