//! Agent Records
//!
//! Static roster entries and the mutable per-agent runtime state built from
//! them.

use serde::{Deserialize, Serialize};

use temple_events::{AgentId, AgentStatus, AgentTier, MotionPlan, Point};

/// One entry of the static agent roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: AgentId,
    /// Display name
    pub name: String,
    /// Romanized name
    pub name_en: String,
    pub tier: AgentTier,
    /// What the agent does, shown in tooltips
    pub role: String,
    /// Body color as `0xRRGGBB`
    pub color: u32,
    /// Glyph drawn next to the name
    pub emoji: String,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: AgentTier) -> Self {
        let name = name.into();
        Self {
            id: AgentId::new(id),
            name_en: name.clone(),
            name,
            tier,
            role: String::new(),
            color: 0xFFBF00,
            emoji: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    /// Label drawn under the agent: glyph then name.
    pub fn display_label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

/// Runtime state of one agent.
///
/// The move in flight is held as a single optional [`MotionPlan`], so the
/// target exists exactly while the agent is moving.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    id: AgentId,
    tier: AgentTier,
    speed: f32,
    pub(crate) position: Point,
    pub(crate) status: AgentStatus,
    pub(crate) motion: Option<MotionPlan>,
    pub(crate) pinned: bool,
}

impl AgentRecord {
    /// Fresh idle record standing at `position`.
    pub fn new(id: AgentId, tier: AgentTier, speed: f32, position: Point) -> Self {
        Self {
            id,
            tier,
            speed,
            position,
            status: AgentStatus::Idle,
            motion: None,
            pinned: false,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn tier(&self) -> AgentTier {
        self.tier
    }

    /// Wander speed in world units per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub fn move_target(&self) -> Option<Point> {
        self.motion.map(|m| m.to)
    }

    pub fn motion(&self) -> Option<&MotionPlan> {
        self.motion.as_ref()
    }

    /// Whether the status simulator is told to leave this agent alone.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}
