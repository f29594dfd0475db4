//! Status Simulator
//!
//! Periodically redraws the status of every agent standing still. Draws are
//! memoryless and weighted.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use temple_events::{AgentId, AgentStatus};

use crate::config::{ConfigError, StatusConfig};
use crate::registry::AgentRegistry;

/// Statuses the simulator draws from, in weight order.
const DRAWN_STATUSES: [AgentStatus; 4] = [
    AgentStatus::Idle,
    AgentStatus::Thinking,
    AgentStatus::Replying,
    AgentStatus::Active,
];

#[derive(Debug, Clone)]
pub struct StatusSimulator {
    interval_ms: u64,
    weights: WeightedIndex<u32>,
}

impl StatusSimulator {
    pub fn new(config: &StatusConfig) -> Result<Self, ConfigError> {
        let w = &config.weights;
        let weights = WeightedIndex::new([w.idle, w.thinking, w.replying, w.active]).map_err(
            |err| ConfigError::Invalid {
                field: "status.weights",
                reason: err.to_string(),
            },
        )?;
        Ok(Self {
            interval_ms: config.tick_interval_ms,
            weights,
        })
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> AgentStatus {
        DRAWN_STATUSES[self.weights.sample(rng)]
    }

    /// Assigns a fresh status to every agent that is neither moving nor
    /// pinned. Returns the ids touched, in registry order.
    pub fn tick<R: Rng + ?Sized>(&self, registry: &mut AgentRegistry, rng: &mut R) -> Vec<AgentId> {
        let mut touched = Vec::new();
        for entry in registry.iter_mut() {
            let record = &mut entry.record;
            if record.is_moving() || record.is_pinned() {
                continue;
            }
            let status = self.draw(rng);
            if status != record.status {
                tracing::debug!("{} status {} -> {}", record.id(), record.status, status);
            }
            record.status = status;
            touched.push(record.id().clone());
        }
        touched
    }
}
