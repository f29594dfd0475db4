//! Drives the controller session from Bevy's frame clock.
//!
//! The session runs on a virtual millisecond clock. Each frame the wall-time
//! delta is scaled, converted to whole milliseconds, and fed to
//! [`TempleSession::advance`]. Updates the session pushes through its
//! listener are buffered and re-emitted as [`PresentationChanged`] events.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use temple_core::TempleSession;
use temple_events::PresentationUpdate;

use crate::camera::PlayPauseEvent;

/// Slowest and fastest playback multipliers.
pub const MIN_TIME_SCALE: f32 = 0.25;
pub const MAX_TIME_SCALE: f32 = 8.0;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionClock>()
            .add_event::<PresentationChanged>()
            .add_systems(
                Update,
                (handle_playback_input, advance_session)
                    .chain()
                    .in_set(SessionStep),
            );
    }
}

/// Systems that move the session clock forward. Anything reading session
/// state for the frame runs after this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionStep;

/// A presentation change coming out of the session.
#[derive(Event, Debug, Clone)]
pub struct PresentationChanged(pub PresentationUpdate);

/// The running session plus the buffer its listener writes into.
#[derive(Resource)]
pub struct TempleDriver {
    pub session: TempleSession,
    inbox: Arc<Mutex<Vec<PresentationUpdate>>>,
}

impl TempleDriver {
    /// Wraps a session and subscribes to its presentation changes. Call
    /// before populating so the initial presentations are captured.
    pub fn new(mut session: TempleSession) -> Self {
        let inbox: Arc<Mutex<Vec<PresentationUpdate>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&inbox);
        session.on_presentation_change(move |update| {
            if let Ok(mut buffer) = sink.lock() {
                buffer.push(update.clone());
            }
        });
        Self { session, inbox }
    }

    /// Takes every update produced since the last drain, in order.
    pub fn drain(&self) -> Vec<PresentationUpdate> {
        match self.inbox.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        }
    }
}

/// Playback state of the virtual clock.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SessionClock {
    pub paused: bool,
    pub time_scale: f32,
    /// Fraction of a millisecond not yet handed to the session.
    carry_ms: f64,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            paused: false,
            time_scale: 1.0,
            carry_ms: 0.0,
        }
    }
}

impl SessionClock {
    pub fn with_time_scale(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE),
            ..Self::default()
        }
    }

    /// Whole milliseconds of session time covered by a frame of
    /// `delta_secs`. Sub-millisecond remainders carry into the next frame.
    pub fn step(&mut self, delta_secs: f32) -> u64 {
        if self.paused || delta_secs <= 0.0 {
            return 0;
        }
        self.carry_ms += delta_secs as f64 * 1_000.0 * self.time_scale as f64;
        let whole = self.carry_ms.floor();
        self.carry_ms -= whole;
        whole as u64
    }

    pub fn faster(&mut self) {
        self.time_scale = (self.time_scale * 2.0).min(MAX_TIME_SCALE);
    }

    pub fn slower(&mut self) {
        self.time_scale = (self.time_scale / 2.0).max(MIN_TIME_SCALE);
    }
}

/// Space pauses, `[` and `]` halve and double playback speed.
fn handle_playback_input(
    mut clock: ResMut<SessionClock>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut play_pause: EventReader<PlayPauseEvent>,
) {
    for _ in play_pause.read() {
        clock.paused = !clock.paused;
        tracing::info!("Playback {}", if clock.paused { "paused" } else { "resumed" });
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        clock.faster();
        tracing::info!("Playback speed x{}", clock.time_scale);
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        clock.slower();
        tracing::info!("Playback speed x{}", clock.time_scale);
    }
}

fn advance_session(
    time: Res<Time>,
    mut clock: ResMut<SessionClock>,
    mut driver: ResMut<TempleDriver>,
    mut changes: EventWriter<PresentationChanged>,
) {
    let delta_ms = clock.step(time.delta_seconds());
    if delta_ms > 0 {
        driver.session.advance(delta_ms);
    }
    // pins from the HUD produce updates even while paused
    for update in driver.drain() {
        changes.send(PresentationChanged(update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use temple_core::config::TempleConfig;
    use temple_core::setup::{create_zone_catalog, default_roster};

    #[test]
    fn test_clock_carries_fractions() {
        let mut clock = SessionClock::default();
        // 15.625 ms per frame
        assert_eq!(clock.step(0.015625), 15);
        assert_eq!(clock.step(0.015625), 16);
        assert_eq!(clock.step(0.001), 1);
    }

    #[test]
    fn test_clock_scale_and_pause() {
        let mut clock = SessionClock::with_time_scale(2.0);
        assert_eq!(clock.step(0.5), 1_000);

        clock.paused = true;
        assert_eq!(clock.step(0.5), 0);
    }

    #[test]
    fn test_clock_speed_limits() {
        let mut clock = SessionClock::with_time_scale(100.0);
        assert_eq!(clock.time_scale, MAX_TIME_SCALE);
        clock.faster();
        assert_eq!(clock.time_scale, MAX_TIME_SCALE);

        for _ in 0..10 {
            clock.slower();
        }
        assert_eq!(clock.time_scale, MIN_TIME_SCALE);
    }

    #[test]
    fn test_driver_buffers_updates() {
        let config = TempleConfig::default();
        let catalog = create_zone_catalog(config.movement.zone_padding).unwrap();
        let session = TempleSession::new(config, catalog, 3).unwrap();

        let mut driver = TempleDriver::new(session);
        driver.session.populate(&default_roster()).unwrap();

        let first = driver.drain();
        assert_eq!(first.len(), 17);
        assert!(driver.drain().is_empty());

        driver.session.advance(60_000);
        assert!(!driver.drain().is_empty());
    }
}
