//! Scene Setup
//!
//! Default zones, the default roster, and where each agent starts.

pub mod layout;
pub mod roster;
pub mod zones;

pub use layout::*;
pub use roster::*;
pub use zones::*;
