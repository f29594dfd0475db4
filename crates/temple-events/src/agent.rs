//! Agent identity, tier and status types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Coarse agent category. Fixed per agent; controls base wander speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTier {
    /// The single coordinating agent.
    #[serde(alias = "L1")]
    Primary,
    /// Second-line agents reporting to the primary.
    #[serde(alias = "L2")]
    Lieutenant,
    /// Rank-and-file bots.
    #[serde(alias = "L3")]
    Worker,
    /// Agents outside the hierarchy (system monitors and the like).
    Special,
}

impl AgentTier {
    pub const ALL: [AgentTier; 4] = [
        AgentTier::Primary,
        AgentTier::Lieutenant,
        AgentTier::Worker,
        AgentTier::Special,
    ];

    /// Short label shown in tooltips and logs.
    pub fn label(self) -> &'static str {
        match self {
            AgentTier::Primary => "L1",
            AgentTier::Lieutenant => "L2",
            AgentTier::Worker => "L3",
            AgentTier::Special => "special",
        }
    }
}

impl fmt::Display for AgentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Displayed agent status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Thinking,
    Replying,
    Active,
    Error,
    Offline,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 6] = [
        AgentStatus::Idle,
        AgentStatus::Thinking,
        AgentStatus::Replying,
        AgentStatus::Active,
        AgentStatus::Error,
        AgentStatus::Offline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Thinking => "thinking",
            AgentStatus::Replying => "replying",
            AgentStatus::Active => "active",
            AgentStatus::Error => "error",
            AgentStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown agent status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for AgentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}
