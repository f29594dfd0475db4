//! Temple floor: zone panels, labels, and the lines joining the halls.

use bevy::prelude::*;

use temple_core::setup::{HIVE_WORKSHOP, LEFT_HALL, RIGHT_HALL, THRONE};
use temple_core::{Zone, ZoneCatalog};
use temple_events::Point;

use crate::scene::{
    hex_color, hex_color_alpha, SceneFrame, DEEP_BLUE, HIVE_GOLD, NIGHT_SKY, TECH_CYAN,
};
use crate::session::TempleDriver;

const EDGE_WIDTH: f32 = 1.0;
const LINK_WIDTH: f32 = 1.5;

pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(hex_color(NIGHT_SKY)))
            .add_systems(Startup, spawn_temple_floor);
    }
}

/// Marker for zone panel entities.
#[derive(Component)]
pub struct ZonePanel {
    pub name: String,
}

/// Lines from the throne down to the halls and from the halls down to the
/// workshop. Pairs whose zones are missing are skipped.
pub fn connection_segments(catalog: &ZoneCatalog) -> Vec<(Point, Point)> {
    let bottom_center = |z: &Zone| Point::new(z.x + z.width / 2.0, z.bottom());
    let top_at = |z: &Zone, fraction: f32| Point::new(z.x + z.width * fraction, z.y);

    let mut segments = Vec::new();
    let throne = catalog.get(THRONE);
    let workshop = catalog.get(HIVE_WORKSHOP);
    for (hall, workshop_fraction) in [(LEFT_HALL, 0.3), (RIGHT_HALL, 0.7)] {
        let Some(hall) = catalog.get(hall) else {
            continue;
        };
        if let Some(throne) = throne {
            segments.push((bottom_center(throne), top_at(hall, 0.5)));
        }
        if let Some(workshop) = workshop {
            segments.push((bottom_center(hall), top_at(workshop, workshop_fraction)));
        }
    }
    segments
}

/// Transform placing a unit-height sprite of width `|b - a|` along `a..b`.
pub fn segment_transform(a: Vec2, b: Vec2, z: f32) -> (Transform, f32) {
    let delta = b - a;
    let midpoint = (a + b) / 2.0;
    let transform = Transform::from_xyz(midpoint.x, midpoint.y, z)
        .with_rotation(Quat::from_rotation_z(delta.y.atan2(delta.x)));
    (transform, delta.length())
}

fn spawn_temple_floor(mut commands: Commands, driver: Res<TempleDriver>, frame: Res<SceneFrame>) {
    let catalog = driver.session.catalog();
    let edge = hex_color_alpha(HIVE_GOLD, 0.4);

    for zone in catalog.zones() {
        let center = frame.rect_center(zone.x, zone.y, zone.width, zone.height);
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: hex_color_alpha(DEEP_BLUE, 0.3),
                    custom_size: Some(Vec2::new(zone.width, zone.height)),
                    ..default()
                },
                transform: Transform::from_xyz(center.x, center.y, 0.0),
                ..default()
            },
            ZonePanel {
                name: zone.name.clone(),
            },
        ));

        let half = Vec2::new(zone.width, zone.height) / 2.0;
        let edges = [
            (Vec2::new(0.0, half.y), Vec2::new(zone.width, EDGE_WIDTH)),
            (Vec2::new(0.0, -half.y), Vec2::new(zone.width, EDGE_WIDTH)),
            (Vec2::new(-half.x, 0.0), Vec2::new(EDGE_WIDTH, zone.height)),
            (Vec2::new(half.x, 0.0), Vec2::new(EDGE_WIDTH, zone.height)),
        ];
        for (offset, size) in edges {
            let at = center + offset;
            commands.spawn(SpriteBundle {
                sprite: Sprite {
                    color: edge,
                    custom_size: Some(size),
                    ..default()
                },
                transform: Transform::from_xyz(at.x, at.y, 0.1),
                ..default()
            });
        }

        let label_at = frame.to_world(Point::new(zone.x + zone.width / 2.0, zone.y + 12.0));
        commands.spawn(Text2dBundle {
            text: Text::from_section(
                zone.label.clone(),
                TextStyle {
                    font_size: 11.0,
                    color: hex_color_alpha(HIVE_GOLD, 0.7),
                    ..default()
                },
            )
            .with_justify(JustifyText::Center),
            transform: Transform::from_xyz(label_at.x, label_at.y, 0.2),
            ..default()
        });
    }

    for (from, to) in connection_segments(catalog) {
        let (transform, length) = segment_transform(frame.to_world(from), frame.to_world(to), 0.05);
        commands.spawn(SpriteBundle {
            sprite: Sprite {
                color: hex_color_alpha(TECH_CYAN, 0.25),
                custom_size: Some(Vec2::new(length, LINK_WIDTH)),
                ..default()
            },
            transform,
            ..default()
        });
    }
    tracing::debug!("Temple floor drawn with {} zones", catalog.zones().len());
}
