//! Zone Geometry
//!
//! Named rectangular regions of the scene and the padding rule that keeps
//! wander targets away from their edges.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use temple_events::Point;

/// A named rectangle in world coordinates. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    /// Display label drawn above the zone.
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Zone {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Closed-rectangle containment: points on the edge are inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Uniformly random point at least `padding` away from every edge.
    pub fn random_interior_point<R: Rng + ?Sized>(&self, rng: &mut R, padding: f32) -> Point {
        Point::new(
            rng.gen_range(self.x + padding..=self.right() - padding),
            rng.gen_range(self.y + padding..=self.bottom() - padding),
        )
    }

    fn check(&self, padding: f32) -> Result<(), ZoneError> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ZoneError::NonFinite {
                name: self.name.clone(),
            });
        }
        if self.width <= 2.0 * padding || self.height <= 2.0 * padding {
            return Err(ZoneError::TooSmall {
                name: self.name.clone(),
                width: self.width,
                height: self.height,
                padding,
            });
        }
        Ok(())
    }
}

/// Errors raised while building a zone catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("zone `{name}` ({width}x{height}) has no interior with padding {padding}")]
    TooSmall {
        name: String,
        width: f32,
        height: f32,
        padding: f32,
    },
    #[error("zone `{name}` has a non-finite coordinate")]
    NonFinite { name: String },
    #[error("zone `{0}` is defined twice")]
    Duplicate(String),
    #[error("padding must be finite and non-negative, got {0}")]
    InvalidPadding(f32),
}

/// Immutable, validated list of zones sharing one padding rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
    padding: f32,
}

impl ZoneCatalog {
    /// Builds a catalog, checking every zone leaves an interior after padding.
    pub fn new(zones: Vec<Zone>, padding: f32) -> Result<Self, ZoneError> {
        if !padding.is_finite() || padding < 0.0 {
            return Err(ZoneError::InvalidPadding(padding));
        }
        for (index, zone) in zones.iter().enumerate() {
            zone.check(padding)?;
            if zones[..index].iter().any(|other| other.name == zone.name) {
                return Err(ZoneError::Duplicate(zone.name.clone()));
            }
        }
        Ok(Self { zones, padding })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// First zone (in catalog order) containing `point`.
    pub fn zone_containing(&self, point: Point) -> Option<&Zone> {
        self.zones.iter().find(|z| z.contains(point))
    }

    /// Largest zone by area; the earliest wins ties.
    pub fn largest(&self) -> Option<&Zone> {
        self.zones.iter().fold(None, |best: Option<&Zone>, zone| match best {
            Some(b) if b.area() >= zone.area() => Some(b),
            _ => Some(zone),
        })
    }

    /// Zone an agent at `point` belongs to, falling back to the largest zone.
    pub fn home_zone(&self, point: Point) -> Option<&Zone> {
        self.zone_containing(point).or_else(|| self.largest())
    }

    /// Uniformly chosen zone from the whole catalog.
    pub fn random_zone<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Zone> {
        self.zones.choose(rng)
    }

    /// Random interior point of `zone` under this catalog's padding.
    pub fn sample<R: Rng + ?Sized>(&self, zone: &Zone, rng: &mut R) -> Point {
        zone.random_interior_point(rng, self.padding)
    }

    /// Whether `point` lies in the union of all zones.
    pub fn contains(&self, point: Point) -> bool {
        self.zone_containing(point).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn catalog() -> ZoneCatalog {
        ZoneCatalog::new(
            vec![
                Zone::new("small", "Small", 0.0, 0.0, 100.0, 100.0),
                Zone::new("big", "Big", 200.0, 0.0, 400.0, 300.0),
            ],
            30.0,
        )
        .unwrap()
    }

    #[test]
    fn test_interior_points_respect_padding() {
        let zone = Zone::new("box", "Box", 0.0, 0.0, 100.0, 100.0);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let p = zone.random_interior_point(&mut rng, 30.0);
            assert!((30.0..=70.0).contains(&p.x), "x out of range: {}", p.x);
            assert!((30.0..=70.0).contains(&p.y), "y out of range: {}", p.y);
        }
    }

    #[test]
    fn test_contains_is_closed() {
        let zone = Zone::new("box", "Box", 50.0, 50.0, 200.0, 200.0);
        assert!(zone.contains(Point::new(50.0, 50.0)));
        assert!(zone.contains(Point::new(250.0, 250.0)));
        assert!(zone.contains(Point::new(100.0, 100.0)));
        assert!(!zone.contains(Point::new(250.1, 100.0)));
        assert!(!zone.contains(Point::new(49.9, 100.0)));
    }

    #[test]
    fn test_home_zone_falls_back_to_largest() {
        let catalog = catalog();
        assert_eq!(catalog.home_zone(Point::new(10.0, 10.0)).unwrap().name, "small");
        assert_eq!(catalog.home_zone(Point::new(300.0, 10.0)).unwrap().name, "big");
        assert_eq!(catalog.home_zone(Point::new(-500.0, 900.0)).unwrap().name, "big");
        assert!(!catalog.contains(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_largest_prefers_first_on_tie() {
        let catalog = ZoneCatalog::new(
            vec![
                Zone::new("a", "A", 0.0, 0.0, 100.0, 100.0),
                Zone::new("b", "B", 200.0, 0.0, 100.0, 100.0),
            ],
            10.0,
        )
        .unwrap();
        assert_eq!(catalog.largest().unwrap().name, "a");
    }

    #[test]
    fn test_empty_catalog_resolves_nothing() {
        let catalog = ZoneCatalog::new(Vec::new(), 30.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(catalog.is_empty());
        assert!(catalog.home_zone(Point::new(0.0, 0.0)).is_none());
        assert!(catalog.random_zone(&mut rng).is_none());
    }

    #[test]
    fn test_random_zone_covers_catalog() {
        let catalog = catalog();
        let mut rng = SmallRng::seed_from_u64(99);
        let mut seen_small = false;
        let mut seen_big = false;
        for _ in 0..200 {
            match catalog.random_zone(&mut rng).unwrap().name.as_str() {
                "small" => seen_small = true,
                "big" => seen_big = true,
                other => panic!("unexpected zone {}", other),
            }
        }
        assert!(seen_small && seen_big);
    }

    #[test]
    fn test_rejects_zone_without_interior() {
        let err = ZoneCatalog::new(vec![Zone::new("thin", "Thin", 0.0, 0.0, 60.0, 200.0)], 30.0)
            .unwrap_err();
        assert!(matches!(err, ZoneError::TooSmall { .. }));
    }

    #[test]
    fn test_rejects_duplicates_and_nan() {
        let err = ZoneCatalog::new(
            vec![
                Zone::new("dup", "Dup", 0.0, 0.0, 100.0, 100.0),
                Zone::new("dup", "Dup", 200.0, 0.0, 100.0, 100.0),
            ],
            10.0,
        )
        .unwrap_err();
        assert_eq!(err, ZoneError::Duplicate("dup".into()));

        let err = ZoneCatalog::new(vec![Zone::new("nan", "NaN", f32::NAN, 0.0, 100.0, 100.0)], 10.0)
            .unwrap_err();
        assert!(matches!(err, ZoneError::NonFinite { .. }));
    }

    #[test]
    fn test_rejects_bad_padding() {
        let zones = || vec![Zone::new("box", "Box", 0.0, 0.0, 100.0, 100.0)];
        assert_eq!(
            ZoneCatalog::new(zones(), -30.0).unwrap_err(),
            ZoneError::InvalidPadding(-30.0)
        );
        assert!(matches!(
            ZoneCatalog::new(zones(), f32::NAN).unwrap_err(),
            ZoneError::InvalidPadding(_)
        ));
        assert!(matches!(
            ZoneCatalog::new(zones(), f32::INFINITY).unwrap_err(),
            ZoneError::InvalidPadding(_)
        ));

        // zero padding is the whole rectangle
        let catalog = ZoneCatalog::new(zones(), 0.0).unwrap();
        let zone = &catalog.zones()[0];
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..1_000 {
            assert!(catalog.contains(catalog.sample(zone, &mut rng)));
        }
    }
}
