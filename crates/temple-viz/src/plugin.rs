//! Main viewer plugin that ties all systems together.

use bevy::prelude::*;

use crate::agents::AgentPlugin;
use crate::backdrop::BackdropPlugin;
use crate::camera::CameraPlugin;
use crate::hud::HudPlugin;
use crate::scene::SceneFrame;
use crate::session::SessionPlugin;
use crate::zones::ZonePlugin;

/// Main plugin for the temple viewer.
///
/// Expects a [`TempleDriver`](crate::session::TempleDriver) resource holding
/// a populated session. A [`SceneFrame`] is inserted with default size unless
/// one is already present.
pub struct TemplePlugin;

impl Plugin for TemplePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Hive Temple".into(),
                        resolution: (1280., 720.).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .init_resource::<SceneFrame>()
        .add_plugins((
            SessionPlugin,
            CameraPlugin,
            BackdropPlugin,
            ZonePlugin,
            AgentPlugin,
            HudPlugin,
        ));
    }
}
