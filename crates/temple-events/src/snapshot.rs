//! Snapshot Types
//!
//! Point-in-time capture of every agent in a session, used by the headless
//! runner's JSON output and by inspection panels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{AgentId, AgentStatus, AgentTier, LoopKind, Point};

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// One agent at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub name: String,
    pub tier: AgentTier,
    pub status: AgentStatus,
    pub position: Point,
    pub is_moving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_target: Option<Point>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<LoopKind>,
    /// Name of the zone containing the agent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Whole-scene snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub snapshot_id: String,
    pub session_id: Uuid,
    pub at_ms: u64,
    pub agents: Vec<AgentSnapshot>,
}

impl SceneSnapshot {
    /// Number of agents per status. Statuses with no agents are omitted.
    pub fn count_by_status(&self) -> BTreeMap<AgentStatus, usize> {
        let mut counts = BTreeMap::new();
        for agent in &self.agents {
            *counts.entry(agent.status).or_insert(0) += 1;
        }
        counts
    }

    /// Number of agents currently walking.
    pub fn moving_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_moving).count()
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id.as_str() == agent_id)
    }
}
