//! Zone Setup
//!
//! The four halls of the default 1280x720 temple scene.

use crate::zone::{Zone, ZoneCatalog, ZoneError};

pub const THRONE: &str = "throne";
pub const LEFT_HALL: &str = "left_hall";
pub const RIGHT_HALL: &str = "right_hall";
pub const HIVE_WORKSHOP: &str = "hive_workshop";

/// Default zones in drawing order.
pub fn default_zones() -> Vec<Zone> {
    vec![
        // Primary seat, top center
        Zone::new(THRONE, "Throne Hall", 560.0, 80.0, 160.0, 120.0),
        // Lieutenant halls flank the throne
        Zone::new(LEFT_HALL, "Intel Hall", 240.0, 200.0, 160.0, 120.0),
        Zone::new(RIGHT_HALL, "Execution Hall", 880.0, 200.0, 160.0, 120.0),
        // Workers share the wide bottom band
        Zone::new(HIVE_WORKSHOP, "Hive Workshop", 80.0, 400.0, 1120.0, 280.0),
    ]
}

/// Catalog of the default zones.
pub fn create_zone_catalog(padding: f32) -> Result<ZoneCatalog, ZoneError> {
    ZoneCatalog::new(default_zones(), padding)
}
