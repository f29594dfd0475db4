//! Shared data types for the hive temple dashboard.
//!
//! This crate contains pure data structures with no scheduling logic.
//! Both the controller core and the renderers depend on it.

pub mod agent;
pub mod geometry;
pub mod presentation;
pub mod snapshot;

pub use agent::{AgentId, AgentStatus, AgentTier, ParseStatusError};
pub use geometry::Point;
pub use presentation::{
    status_color, EffectId, EffectInstance, LoopKind, MotionPlan, Presentation,
    PresentationUpdate, StatusIcon,
};
pub use snapshot::{generate_snapshot_id, AgentSnapshot, SceneSnapshot};
