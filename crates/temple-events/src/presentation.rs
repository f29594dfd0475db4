//! Presentation types: what renderers are told to draw for each agent.
//!
//! The controller core derives a [`Presentation`] from an agent's status and
//! motion, and publishes it as a [`PresentationUpdate`]. Renderers own the
//! pixels but never decide which effect runs.

use serde::{Deserialize, Serialize};

use crate::{AgentId, AgentStatus, Point};

/// Looping micro-animation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    /// Fast squash/stretch with a slight sway while walking.
    Walk,
    /// Alpha flashing for agents in error.
    Flash,
    /// Gentle scale breathing for thinking/replying agents.
    Breathe,
}

impl LoopKind {
    /// Duration of one half-cycle (there and back is twice this).
    pub fn half_period_ms(self) -> u64 {
        match self {
            LoopKind::Walk => 150,
            LoopKind::Flash => 400,
            LoopKind::Breathe => 800,
        }
    }

    /// Half-cycle of the secondary sway played with the walk loop.
    pub const WALK_SWAY_HALF_PERIOD_MS: u64 = 200;
    /// Peak sway angle in degrees (either side of upright).
    pub const WALK_SWAY_DEGREES: f32 = 3.0;
    /// Horizontal stretch at the peak of the walk cycle.
    pub const WALK_STRETCH_X: f32 = 1.08;
    /// Vertical squash at the peak of the walk cycle.
    pub const WALK_SQUASH_Y: f32 = 0.92;
    /// Alpha at the dim end of the flash cycle.
    pub const FLASH_MIN_ALPHA: f32 = 0.3;
    /// Scale at the peak of the breathing cycle.
    pub const BREATHE_PEAK_SCALE: f32 = 1.05;
}

/// Icon shown in an agent's status bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Walking,
    Idle,
    Thinking,
    Replying,
    Active,
    Error,
    Offline,
}

impl StatusIcon {
    /// Icon matching a status when the agent is standing still.
    pub fn for_status(status: AgentStatus) -> Self {
        match status {
            AgentStatus::Idle => StatusIcon::Idle,
            AgentStatus::Thinking => StatusIcon::Thinking,
            AgentStatus::Replying => StatusIcon::Replying,
            AgentStatus::Active => StatusIcon::Active,
            AgentStatus::Error => StatusIcon::Error,
            AgentStatus::Offline => StatusIcon::Offline,
        }
    }

    /// Glyph drawn inside the bubble.
    pub fn glyph(self) -> &'static str {
        match self {
            StatusIcon::Walking => "🚶",
            StatusIcon::Idle => "💤",
            StatusIcon::Thinking => "💭",
            StatusIcon::Replying => "💬",
            StatusIcon::Active => "⚡",
            StatusIcon::Error => "❌",
            StatusIcon::Offline => "🔇",
        }
    }
}

/// Bubble color for a status, as `0xRRGGBB`.
pub fn status_color(status: AgentStatus) -> u32 {
    match status {
        AgentStatus::Idle => 0x94A3B8,
        AgentStatus::Thinking => 0xFBBF24,
        AgentStatus::Replying | AgentStatus::Active => 0x22C55E,
        AgentStatus::Error => 0xEF4444,
        AgentStatus::Offline => 0x475569,
    }
}

/// Identifier of one running effect instance. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(pub u64);

/// A running looping effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectInstance {
    pub id: EffectId,
    pub kind: LoopKind,
}

/// Straight-line move from `from` to `to`, starting at `started_at_ms` on
/// the session clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionPlan {
    pub from: Point,
    pub to: Point,
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

impl MotionPlan {
    /// Session time at which the move lands.
    pub fn ends_at_ms(&self) -> u64 {
        self.started_at_ms + self.duration_ms
    }

    /// Fraction of the move completed at `now_ms`, in `[0, 1]`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        (elapsed as f64 / self.duration_ms as f64).min(1.0) as f32
    }

    /// Interpolated position at `now_ms`. Always on the segment between the
    /// endpoints, and exactly `to` once the move has ended.
    pub fn position_at(&self, now_ms: u64) -> Point {
        if now_ms >= self.ends_at_ms() {
            return self.to;
        }
        self.from.lerp(self.to, self.progress(now_ms))
    }
}

/// Concrete presentation for one agent: looping effect, icon and opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub effect: Option<LoopKind>,
    pub icon: StatusIcon,
    pub opacity: f32,
}

/// Presentation change pushed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationUpdate {
    pub agent_id: AgentId,
    /// Session time the update was produced.
    pub at_ms: u64,
    /// Authoritative position when the update was produced.
    pub position: Point,
    pub status: AgentStatus,
    pub is_moving: bool,
    /// The move in flight, for renderers that tween it themselves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionPlan>,
    /// The effect instance that should be running. A different id than the
    /// renderer currently plays means restart; the same id means keep going.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectInstance>,
    pub icon: StatusIcon,
    pub opacity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> MotionPlan {
        MotionPlan {
            from: Point::new(100.0, 100.0),
            to: Point::new(150.0, 100.0),
            started_at_ms: 1_000,
            duration_ms: 500,
        }
    }

    #[test]
    fn test_motion_plan_position_at() {
        let plan = plan();
        assert_eq!(plan.ends_at_ms(), 1_500);
        assert_eq!(plan.position_at(900), Point::new(100.0, 100.0));
        assert_eq!(plan.position_at(1_000), Point::new(100.0, 100.0));
        assert_eq!(plan.position_at(1_250), Point::new(125.0, 100.0));
        assert_eq!(plan.position_at(1_500), Point::new(150.0, 100.0));
        assert_eq!(plan.position_at(9_999), Point::new(150.0, 100.0));
    }

    #[test]
    fn test_motion_plan_zero_duration() {
        let plan = MotionPlan {
            duration_ms: 0,
            ..plan()
        };
        assert_eq!(plan.progress(1_000), 1.0);
        assert_eq!(plan.position_at(1_000), plan.to);
    }

    #[test]
    fn test_motion_plan_is_monotonic() {
        let plan = plan();
        let mut last = plan.from.x;
        for now in (1_000..=1_500).step_by(7) {
            let x = plan.position_at(now).x;
            assert!(x >= last);
            last = x;
        }
    }

    #[test]
    fn test_icon_for_status() {
        assert_eq!(StatusIcon::for_status(AgentStatus::Error), StatusIcon::Error);
        assert_eq!(StatusIcon::for_status(AgentStatus::Idle).glyph(), "💤");
        assert_eq!(StatusIcon::Walking.glyph(), "🚶");
    }

    #[test]
    fn test_update_serialization_skips_empty_fields() {
        let update = PresentationUpdate {
            agent_id: AgentId::new("xiaosen"),
            at_ms: 3_000,
            position: Point::new(1.0, 2.0),
            status: AgentStatus::Idle,
            is_moving: false,
            motion: None,
            effect: None,
            icon: StatusIcon::Idle,
            opacity: 1.0,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(!json.contains("motion"));
        assert!(!json.contains("effect"));
        let back: PresentationUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }

    #[test]
    fn test_loop_kind_serialization() {
        assert_eq!(serde_json::to_string(&LoopKind::Breathe).unwrap(), r#""breathe""#);
        assert_eq!(LoopKind::Walk.half_period_ms(), 150);
    }
}
