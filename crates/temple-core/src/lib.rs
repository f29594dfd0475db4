//! Core controller for the hive temple dashboard: zones, agent records, the
//! wander scheduler, motion, the status simulator, and the animation
//! coordinator, all driven by a virtual-time session.

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod motion;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod setup;
pub mod status;
pub mod timers;
pub mod zone;

pub use agent::{AgentRecord, RosterEntry};
pub use config::{ConfigError, TempleConfig};
pub use coordinator::{presentation_for, AnimationCoordinator};
pub use motion::{MotionError, MotionExecutor};
pub use scheduler::{MovementScheduler, WanderKind, WanderOutcome};
pub use session::{PresentationListener, SessionError, TempleSession};
pub use status::StatusSimulator;
pub use timers::{Millis, TimerId, TimerQueue};
pub use zone::{Zone, ZoneCatalog, ZoneError};
