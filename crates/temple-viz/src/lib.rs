//! Bevy viewer for the hive temple: draws the zones and replays the
//! presentation updates of a live controller session.

pub mod agents;
pub mod backdrop;
pub mod camera;
pub mod effects;
pub mod hud;
pub mod plugin;
pub mod scene;
pub mod session;
pub mod zones;

pub use plugin::TemplePlugin;
pub use session::TempleDriver;
