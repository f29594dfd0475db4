//! Scene frame and palette.
//!
//! The controller works in scene units with the origin at the top-left
//! corner and y growing downward. Bevy's 2D world has its origin at the
//! center and y growing upward.

use bevy::prelude::*;

use temple_events::Point;

pub const NIGHT_SKY: u32 = 0x0F172A;
pub const DEEP_BLUE: u32 = 0x1E3A8A;
pub const HIVE_GOLD: u32 = 0xFFBF00;
pub const TECH_CYAN: u32 = 0x00D4FF;
pub const UI_TEXT: u32 = 0xE2E8F0;
pub const UI_MUTED: u32 = 0x94A3B8;
/// Agent head fill.
pub const SKIN: u32 = 0xFDE68A;

/// `0xRRGGBB` as an opaque color.
pub fn hex_color(rgb: u32) -> Color {
    hex_color_alpha(rgb, 1.0)
}

pub fn hex_color_alpha(rgb: u32, alpha: f32) -> Color {
    let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
    Color::srgba(channel(16), channel(8), channel(0), alpha)
}

/// Size of the scene the controller lays agents out in.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SceneFrame {
    pub width: f32,
    pub height: f32,
}

impl Default for SceneFrame {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl SceneFrame {
    /// Scene point to Bevy world position.
    pub fn to_world(&self, p: Point) -> Vec2 {
        Vec2::new(p.x - self.width / 2.0, self.height / 2.0 - p.y)
    }

    /// Bevy world position to scene point.
    pub fn to_scene(&self, v: Vec2) -> Point {
        Point::new(v.x + self.width / 2.0, self.height / 2.0 - v.y)
    }

    /// Center of a scene rectangle given by its top-left corner and size.
    pub fn rect_center(&self, x: f32, y: f32, width: f32, height: f32) -> Vec2 {
        self.to_world(Point::new(x + width / 2.0, y + height / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_corners() {
        let frame = SceneFrame::default();
        assert_eq!(frame.to_world(Point::new(0.0, 0.0)), Vec2::new(-640.0, 360.0));
        assert_eq!(frame.to_world(Point::new(1280.0, 720.0)), Vec2::new(640.0, -360.0));
        assert_eq!(frame.to_world(Point::new(640.0, 360.0)), Vec2::ZERO);
    }

    #[test]
    fn test_frame_inverse() {
        let frame = SceneFrame::default();
        let p = Point::new(320.0, 270.0);
        assert_eq!(frame.to_scene(frame.to_world(p)), p);
    }

    #[test]
    fn test_rect_center() {
        let frame = SceneFrame::default();
        // throne hall
        assert_eq!(frame.rect_center(560.0, 80.0, 160.0, 120.0), Vec2::new(0.0, 220.0));
    }

    #[test]
    fn test_hex_color() {
        let srgba = hex_color(HIVE_GOLD).to_srgba();
        assert_eq!(srgba.red, 1.0);
        assert!((srgba.green - 191.0 / 255.0).abs() < 1e-6);
        assert_eq!(srgba.blue, 0.0);
        assert_eq!(hex_color_alpha(NIGHT_SKY, 0.4).alpha(), 0.4);
    }
}
