//! Camera: pan, zoom, follow, and the eased return to the full view.

use bevy::prelude::*;

use temple_events::AgentId;

use crate::agents::VisualAgent;
use crate::hud::Selection;
use crate::scene::SceneFrame;

/// Plugin for camera control and movement.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraController>()
            .init_resource::<CameraConstraints>()
            .add_event::<PlayPauseEvent>()
            .add_systems(Startup, (setup_camera, fit_constraints_to_scene))
            .add_systems(
                Update,
                (
                    handle_camera_input,
                    handle_keyboard_input,
                    follow_selected_agent,
                    ease_camera,
                    apply_camera_to_transform,
                )
                    .chain(),
            );
    }
}

/// Event emitted when play/pause is toggled.
#[derive(Event)]
pub struct PlayPauseEvent;

/// Main camera controller resource.
#[derive(Resource)]
pub struct CameraController {
    /// Current camera position in world coordinates.
    pub position: Vec2,
    /// Current zoom level (1.0 shows the whole temple).
    pub zoom: f32,
    pub target_position: Vec2,
    pub target_zoom: f32,
    pub mode: CameraMode,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            target_position: Vec2::ZERO,
            target_zoom: 1.0,
            mode: CameraMode::Free,
        }
    }
}

impl CameraController {
    /// Drops follow mode and eases back to the whole temple.
    pub fn reset_view(&mut self) {
        self.mode = CameraMode::Free;
        self.target_position = Vec2::ZERO;
        self.target_zoom = 1.0;
    }

    /// Moves position and zoom part of the way toward their targets.
    pub fn approach(&mut self, delta_secs: f32) {
        let t = (5.0 * delta_secs).min(1.0);
        self.position = self.position.lerp(self.target_position, t);
        self.zoom += (self.target_zoom - self.zoom) * t;
    }

    pub fn is_free(&self) -> bool {
        matches!(self.mode, CameraMode::Free)
    }

    /// Agent the camera is tracking, if any.
    pub fn following(&self) -> Option<&AgentId> {
        match &self.mode {
            CameraMode::Follow { agent_id } => Some(agent_id),
            CameraMode::Free => None,
        }
    }

    pub fn set_free(&mut self) {
        self.mode = CameraMode::Free;
    }

    pub fn follow(&mut self, agent_id: AgentId) {
        self.mode = CameraMode::Follow { agent_id };
    }
}

/// Camera control mode.
#[derive(Clone, Debug, Default)]
pub enum CameraMode {
    /// User pans and zooms by hand.
    #[default]
    Free,
    /// Camera tracks one agent as it wanders.
    Follow { agent_id: AgentId },
}

/// Zoom toward a specific world point.
///
/// Adjusts the camera position so that the point under the cursor stays at
/// the same screen position after zooming.
pub fn zoom_toward_point(
    controller: &mut CameraController,
    cursor_world_pos: Vec2,
    zoom_delta: f32,
    constraints: &CameraConstraints,
) {
    let old_zoom = controller.zoom;
    let new_zoom = constraints.clamp_zoom(old_zoom * (1.0 + zoom_delta));

    // (cursor - old_pos) * old_zoom == (cursor - new_pos) * new_zoom
    let zoom_ratio = new_zoom / old_zoom;
    let offset = cursor_world_pos - controller.position;
    controller.position = constraints.clamp_position(cursor_world_pos - offset / zoom_ratio);
    controller.zoom = new_zoom;
    controller.target_zoom = new_zoom;
    controller.target_position = controller.position;
}

/// Camera constraints for zooming and panning.
#[derive(Resource)]
pub struct CameraConstraints {
    /// Minimum zoom level (zoomed out).
    pub min_zoom: f32,
    /// Maximum zoom level (zoomed in).
    pub max_zoom: f32,
    /// Optional bounds to constrain camera position.
    pub bounds: Option<Rect>,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 4.0,
            bounds: None,
        }
    }
}

impl CameraConstraints {
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Clamp a position to valid bounds if bounds are set.
    pub fn clamp_position(&self, pos: Vec2) -> Vec2 {
        match &self.bounds {
            Some(bounds) => Vec2::new(
                pos.x.clamp(bounds.min.x, bounds.max.x),
                pos.y.clamp(bounds.min.y, bounds.max.y),
            ),
            None => pos,
        }
    }
}

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), MainCamera));
}

/// Keeps the camera center over the temple floor.
fn fit_constraints_to_scene(frame: Res<SceneFrame>, mut constraints: ResMut<CameraConstraints>) {
    let half = Vec2::new(frame.width, frame.height) / 2.0;
    constraints.bounds = Some(Rect::from_corners(-half, half));
}

/// System to handle camera input (pan and zoom).
fn handle_camera_input(
    mut controller: ResMut<CameraController>,
    constraints: Res<CameraConstraints>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<bevy::input::mouse::MouseMotion>,
    mut scroll: EventReader<bevy::input::mouse::MouseWheel>,
    windows: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    let is_panning =
        mouse_button.pressed(MouseButton::Right) || mouse_button.pressed(MouseButton::Middle);

    if is_panning {
        let mut delta = Vec2::ZERO;
        for motion in mouse_motion.read() {
            delta += motion.delta;
        }

        if delta != Vec2::ZERO {
            controller.set_free();
            // Faster when zoomed out
            let pan_speed = 1.0 / controller.zoom;
            controller.position -= Vec2::new(delta.x, -delta.y) * pan_speed;
            controller.position = constraints.clamp_position(controller.position);
            controller.target_position = controller.position;
        }
    } else {
        mouse_motion.clear();
    }

    for ev in scroll.read() {
        let zoom_delta = ev.y * 0.1;
        let cursor_world = window.cursor_position().and_then(|cursor| {
            let (camera, camera_transform) = camera_query.get_single().ok()?;
            camera.viewport_to_world_2d(camera_transform, cursor)
        });
        match cursor_world {
            // a followed agent stays centered, so zoom about the center
            Some(world_pos) if controller.is_free() => {
                zoom_toward_point(&mut controller, world_pos, zoom_delta, &constraints);
            }
            _ => {
                let new_zoom = constraints.clamp_zoom(controller.zoom * (1.0 + zoom_delta));
                controller.zoom = new_zoom;
                controller.target_zoom = new_zoom;
            }
        }
    }
}

/// System to handle keyboard input for camera controls.
fn handle_keyboard_input(
    mut controller: ResMut<CameraController>,
    constraints: Res<CameraConstraints>,
    keyboard: Res<ButtonInput<KeyCode>>,
    selection: Res<Selection>,
    time: Res<Time>,
    mut play_pause_events: EventWriter<PlayPauseEvent>,
) {
    let delta = time.delta_seconds();

    let shift_held = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
    let base_pan_speed = if shift_held { 800.0 } else { 400.0 };
    let pan_speed = base_pan_speed / controller.zoom * delta;

    let mut pan_delta = Vec2::ZERO;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        pan_delta.x -= pan_speed;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        pan_delta.x += pan_speed;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        pan_delta.y += pan_speed;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        pan_delta.y -= pan_speed;
    }

    if pan_delta != Vec2::ZERO {
        controller.set_free();
        controller.position = constraints.clamp_position(controller.position + pan_delta);
        controller.target_position = controller.position;
    }

    // Home - back to the whole temple
    if keyboard.just_pressed(KeyCode::Home) {
        controller.reset_view();
    }

    // F - follow the selected agent, again to let go
    if keyboard.just_pressed(KeyCode::KeyF) {
        let followed = controller.following().cloned();
        match (&selection.agent, followed) {
            (Some(selected), Some(followed)) if *selected == followed => controller.set_free(),
            (Some(selected), _) => {
                controller.follow(selected.clone());
                if controller.target_zoom < 2.0 {
                    controller.target_zoom = constraints.clamp_zoom(2.0);
                }
            }
            (None, _) => controller.set_free(),
        }
    }

    if keyboard.just_pressed(KeyCode::Equal) {
        let new_zoom = constraints.clamp_zoom(controller.zoom * 1.25);
        controller.zoom = new_zoom;
        controller.target_zoom = new_zoom;
    }
    if keyboard.just_pressed(KeyCode::Minus) {
        let new_zoom = constraints.clamp_zoom(controller.zoom / 1.25);
        controller.zoom = new_zoom;
        controller.target_zoom = new_zoom;
    }

    if keyboard.just_pressed(KeyCode::Space) {
        play_pause_events.send(PlayPauseEvent);
    }
}

/// Points the camera at the followed agent; drops follow mode if it is gone.
fn follow_selected_agent(
    mut controller: ResMut<CameraController>,
    constraints: Res<CameraConstraints>,
    agents: Query<(&VisualAgent, &Transform)>,
) {
    let Some(followed) = controller.following().cloned() else {
        return;
    };
    match agents.iter().find(|(agent, _)| agent.agent_id == followed) {
        Some((_, transform)) => {
            controller.target_position = constraints.clamp_position(transform.translation.truncate());
        }
        None => controller.set_free(),
    }
}

fn ease_camera(mut controller: ResMut<CameraController>, time: Res<Time>) {
    controller.approach(time.delta_seconds());
}

fn apply_camera_to_transform(
    controller: Res<CameraController>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    for mut transform in camera_query.iter_mut() {
        transform.translation.x = controller.position.x;
        transform.translation.y = controller.position.y;
        // Zoom is applied via scale (inverse relationship)
        let scale = 1.0 / controller.zoom;
        transform.scale = Vec3::new(scale, scale, 1.0);
    }
}
