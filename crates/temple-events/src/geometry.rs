//! World-space geometry.
//!
//! World coordinates follow the dashboard canvas: origin at the top-left of
//! the scene, `y` growing downward, units in pixels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward `other`. `t` is clamped to `[0, 1]`, and
    /// the endpoints are returned verbatim at `t == 0` and `t == 1`.
    pub fn lerp(self, other: Point, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
