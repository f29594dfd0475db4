//! Decorative backdrop: a faint honeycomb grid behind the zones and a few
//! gold and cyan motes drifting upward.

use std::f32::consts::PI;

use bevy::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use temple_events::Point;

use crate::effects::{sine_in_out, yoyo};
use crate::scene::{hex_color, hex_color_alpha, SceneFrame, HIVE_GOLD, TECH_CYAN};
use crate::zones::segment_transform;

/// Circumradius of one grid cell.
pub const HEX_RADIUS: f32 = 24.0;
const GRID_LINE_WIDTH: f32 = 0.5;
const MOTE_COUNT: usize = 15;

pub struct BackdropPlugin;

impl Plugin for BackdropPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_hex_grid, spawn_motes))
            .add_systems(Update, drift_motes);
    }
}

/// Centers of a pointy-top honeycomb covering a `width` x `height` scene,
/// one cell past each edge. Odd rows shift half a cell right.
pub fn hex_grid_centers(width: f32, height: f32, radius: f32) -> Vec<Point> {
    let cell_w = radius * 3f32.sqrt();
    let row_step = radius * 2.0 * 0.75;
    let rows = (height / row_step).ceil() as i32 + 1;
    let cols = (width / cell_w).ceil() as i32 + 1;

    let mut centers = Vec::new();
    for row in -1..rows {
        let shift = if row.rem_euclid(2) == 1 { cell_w / 2.0 } else { 0.0 };
        for col in -1..cols {
            centers.push(Point::new(col as f32 * cell_w + shift, row as f32 * row_step));
        }
    }
    centers
}

/// Corners of a pointy-top hexagon, starting at the upper right.
pub fn hexagon_corners(center: Point, radius: f32) -> [Point; 6] {
    std::array::from_fn(|i| {
        let angle = PI / 3.0 * i as f32 - PI / 6.0;
        Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
    })
}

/// One drifting mote. Positions are in scene units.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Mote {
    pub start: Point,
    /// Offset reached at the far end of the drift.
    pub offset: Point,
    /// Time to drift out; drifting back takes as long again.
    pub half_period_ms: u64,
    pub delay_ms: u64,
    pub color: u32,
    /// Opacity scale applied on top of the fade.
    pub strength: f32,
}

impl Mote {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, frame: &SceneFrame) -> Self {
        Self {
            start: Point::new(rng.gen_range(0.0..frame.width), rng.gen_range(0.0..frame.height)),
            offset: Point::new(rng.gen_range(-50.0..50.0), -rng.gen_range(50.0..150.0)),
            half_period_ms: rng.gen_range(4_000..10_000),
            delay_ms: rng.gen_range(0..3_000),
            color: if rng.gen_bool(0.5) { HIVE_GOLD } else { TECH_CYAN },
            strength: rng.gen_range(0.5..1.0),
        }
    }

    /// Position and opacity after `elapsed_ms` of wall time.
    pub fn state_at(&self, elapsed_ms: u64) -> (Point, f32) {
        let t = sine_in_out(yoyo(elapsed_ms.saturating_sub(self.delay_ms), self.half_period_ms));
        let at = Point::new(self.start.x + self.offset.x * t, self.start.y + self.offset.y * t);
        (at, 0.3 * (1.0 - t) * self.strength)
    }
}

fn spawn_hex_grid(mut commands: Commands, frame: Res<SceneFrame>) {
    let color = hex_color_alpha(HIVE_GOLD, 0.08);
    let mut edges = 0;
    for center in hex_grid_centers(frame.width, frame.height, HEX_RADIUS) {
        let corners = hexagon_corners(center, HEX_RADIUS);
        for i in 0..corners.len() {
            let a = frame.to_world(corners[i]);
            let b = frame.to_world(corners[(i + 1) % corners.len()]);
            let (transform, length) = segment_transform(a, b, -0.08);
            commands.spawn(SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(Vec2::new(length, GRID_LINE_WIDTH)),
                    ..default()
                },
                transform,
                ..default()
            });
            edges += 1;
        }
    }
    tracing::debug!("Backdrop grid drawn with {} edges", edges);
}

fn spawn_motes(mut commands: Commands, frame: Res<SceneFrame>) {
    let mut rng = SmallRng::from_entropy();
    for _ in 0..MOTE_COUNT {
        let mote = Mote::random(&mut rng, &frame);
        let size = rng.gen_range(2.0..6.0);
        let at = frame.to_world(mote.start);
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: hex_color(mote.color),
                    custom_size: Some(Vec2::splat(size)),
                    ..default()
                },
                transform: Transform::from_xyz(at.x, at.y, -0.04),
                ..default()
            },
            mote,
        ));
    }
}

fn drift_motes(
    time: Res<Time>,
    frame: Res<SceneFrame>,
    mut motes: Query<(&Mote, &mut Transform, &mut Sprite)>,
) {
    let elapsed_ms = time.elapsed().as_millis() as u64;
    for (mote, mut transform, mut sprite) in motes.iter_mut() {
        let (at, alpha) = mote.state_at(elapsed_ms);
        let world = frame.to_world(at);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
        sprite.color = hex_color_alpha(mote.color, alpha);
    }
}
