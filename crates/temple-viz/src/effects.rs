//! Loop effect sampling.
//!
//! Pure functions turning a running [`LoopKind`] and the time since it
//! started into a pose. All loops are yoyo cycles: out over one half-period,
//! back over the next.

use bevy::prelude::*;
use std::f32::consts::PI;

use temple_events::LoopKind;

/// Transform and alpha applied to an agent's body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPose {
    pub scale: Vec2,
    pub angle_deg: f32,
    pub alpha: f32,
}

impl LoopPose {
    pub const REST: LoopPose = LoopPose {
        scale: Vec2::ONE,
        angle_deg: 0.0,
        alpha: 1.0,
    };
}

/// Triangle wave: 0 at the start of a cycle, 1 after one half-period, back
/// to 0 after two.
pub fn yoyo(elapsed_ms: u64, half_period_ms: u64) -> f32 {
    if half_period_ms == 0 {
        return 0.0;
    }
    let phase = elapsed_ms % (2 * half_period_ms);
    if phase <= half_period_ms {
        phase as f32 / half_period_ms as f32
    } else {
        (2 * half_period_ms - phase) as f32 / half_period_ms as f32
    }
}

pub fn sine_in_out(t: f32) -> f32 {
    0.5 - 0.5 * (PI * t).cos()
}

/// Pose of `kind` after it has run for `elapsed_ms`.
pub fn loop_pose(kind: LoopKind, elapsed_ms: u64) -> LoopPose {
    match kind {
        LoopKind::Walk => {
            let stride = sine_in_out(yoyo(elapsed_ms, kind.half_period_ms()));
            let sway = sine_in_out(yoyo(elapsed_ms, LoopKind::WALK_SWAY_HALF_PERIOD_MS));
            LoopPose {
                scale: Vec2::new(
                    1.0 + (LoopKind::WALK_STRETCH_X - 1.0) * stride,
                    1.0 + (LoopKind::WALK_SQUASH_Y - 1.0) * stride,
                ),
                angle_deg: LoopKind::WALK_SWAY_DEGREES * (2.0 * sway - 1.0),
                alpha: 1.0,
            }
        }
        LoopKind::Flash => {
            let t = yoyo(elapsed_ms, kind.half_period_ms());
            LoopPose {
                alpha: 1.0 - (1.0 - LoopKind::FLASH_MIN_ALPHA) * t,
                ..LoopPose::REST
            }
        }
        LoopKind::Breathe => {
            let t = sine_in_out(yoyo(elapsed_ms, kind.half_period_ms()));
            LoopPose {
                scale: Vec2::splat(1.0 + (LoopKind::BREATHE_PEAK_SCALE - 1.0) * t),
                ..LoopPose::REST
            }
        }
    }
}
