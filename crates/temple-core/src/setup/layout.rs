//! Start Layout
//!
//! Where each roster entry stands when the scene opens:
//! - the primary sits in the throne hall, 70 units below its top edge;
//! - lieutenants alternate between the left and right halls at the same
//!   depth, spreading sideways when a hall holds more than one;
//! - workers fill the workshop in a grid of at most seven columns;
//! - specials hover in the throne hall's upper-right corner, stacked down.
//!
//! A hall missing from the catalog is replaced by the largest zone. Every
//! position is clamped into the zone it was laid out in.

use temple_events::{AgentTier, Point};

use crate::agent::RosterEntry;
use crate::zone::{Zone, ZoneCatalog};

use super::zones::{HIVE_WORKSHOP, LEFT_HALL, RIGHT_HALL, THRONE};

/// Depth below a hall's top edge where its seats are.
const SEAT_DEPTH: f32 = 70.0;
/// Widest worker grid.
const MAX_GRID_COLUMNS: usize = 7;
/// Inset of the special agents' corner.
const CORNER_INSET: f32 = 20.0;
/// Vertical gap between stacked specials.
const CORNER_STEP: f32 = 30.0;

/// Start positions, one per roster entry and in roster order. Agents go to
/// the origin only when the catalog is empty.
pub fn layout_positions(roster: &[RosterEntry], catalog: &ZoneCatalog) -> Vec<Point> {
    let mut positions = vec![Point::new(0.0, 0.0); roster.len()];

    let indices = |tier: AgentTier| -> Vec<usize> {
        roster
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tier == tier)
            .map(|(i, _)| i)
            .collect()
    };

    if let Some(throne) = hall(catalog, THRONE) {
        place_row(&mut positions, &indices(AgentTier::Primary), throne);
        for (k, &i) in indices(AgentTier::Special).iter().enumerate() {
            let y = throne.y + CORNER_INSET + k as f32 * CORNER_STEP;
            positions[i] = clamp_into(throne, Point::new(throne.right() - CORNER_INSET, y));
        }
    }

    let lieutenants = indices(AgentTier::Lieutenant);
    let (left, right): (Vec<(usize, usize)>, Vec<(usize, usize)>) =
        lieutenants.iter().copied().enumerate().partition(|(k, _)| k % 2 == 0);
    let left: Vec<usize> = left.into_iter().map(|(_, i)| i).collect();
    let right: Vec<usize> = right.into_iter().map(|(_, i)| i).collect();
    if let Some(zone) = hall(catalog, LEFT_HALL) {
        place_row(&mut positions, &left, zone);
    }
    if let Some(zone) = hall(catalog, RIGHT_HALL) {
        place_row(&mut positions, &right, zone);
    }

    if let Some(workshop) = hall(catalog, HIVE_WORKSHOP) {
        place_grid(&mut positions, &indices(AgentTier::Worker), workshop);
    }

    positions
}

fn hall<'a>(catalog: &'a ZoneCatalog, name: &str) -> Option<&'a Zone> {
    catalog.get(name).or_else(|| catalog.largest())
}

/// Evenly spaced along one row at seat depth; a single agent lands on the
/// center line.
fn place_row(positions: &mut [Point], indices: &[usize], zone: &Zone) {
    let spacing = zone.width / (indices.len() + 1) as f32;
    for (k, &i) in indices.iter().enumerate() {
        let p = Point::new(zone.x + spacing * (k + 1) as f32, zone.y + SEAT_DEPTH);
        positions[i] = clamp_into(zone, p);
    }
}

fn place_grid(positions: &mut [Point], indices: &[usize], zone: &Zone) {
    if indices.is_empty() {
        return;
    }
    let cols = indices.len().min(MAX_GRID_COLUMNS);
    let rows = indices.len().div_ceil(cols);
    let spacing_x = zone.width / (cols + 1) as f32;
    let spacing_y = zone.height / (rows + 1) as f32;
    for (k, &i) in indices.iter().enumerate() {
        let col = k % cols;
        let row = k / cols;
        let p = Point::new(
            zone.x + spacing_x * (col + 1) as f32,
            zone.y + spacing_y * (row + 1) as f32,
        );
        positions[i] = clamp_into(zone, p);
    }
}

fn clamp_into(zone: &Zone, p: Point) -> Point {
    Point::new(p.x.clamp(zone.x, zone.right()), p.y.clamp(zone.y, zone.bottom()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{create_zone_catalog, default_roster};

    fn position_of(roster: &[RosterEntry], positions: &[Point], id: &str) -> Point {
        let index = roster.iter().position(|e| e.id.as_str() == id).unwrap();
        positions[index]
    }

    #[test]
    fn test_default_layout() {
        let roster = default_roster();
        let catalog = create_zone_catalog(30.0).unwrap();
        let positions = layout_positions(&roster, &catalog);

        assert_eq!(positions.len(), roster.len());
        assert_eq!(position_of(&roster, &positions, "jiangziya"), Point::new(640.0, 150.0));
        assert_eq!(position_of(&roster, &positions, "daji"), Point::new(320.0, 270.0));
        assert_eq!(position_of(&roster, &positions, "zhouwang"), Point::new(960.0, 270.0));
        assert_eq!(position_of(&roster, &positions, "yuanshi"), Point::new(700.0, 100.0));
        // first worker: column 1 of 7, row 1 of 2
        assert_eq!(position_of(&roster, &positions, "qianliyan"), Point::new(220.0, 400.0 + 280.0 / 3.0));
    }

    #[test]
    fn test_every_agent_starts_inside_a_zone() {
        let roster = default_roster();
        let catalog = create_zone_catalog(30.0).unwrap();
        for (entry, p) in roster.iter().zip(layout_positions(&roster, &catalog)) {
            assert!(catalog.contains(p), "{} starts outside every zone at {}", entry.id, p);
        }
    }

    #[test]
    fn test_extra_lieutenants_spread_sideways() {
        let roster: Vec<RosterEntry> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| RosterEntry::new(*id, *id, AgentTier::Lieutenant))
            .collect();
        let catalog = create_zone_catalog(30.0).unwrap();
        let positions = layout_positions(&roster, &catalog);
        let left = catalog.get(LEFT_HALL).unwrap();
        assert!(left.contains(positions[0]) && left.contains(positions[2]));
        assert!(positions[0].x < positions[2].x);
        assert_eq!(positions[0].y, positions[2].y);
        let right = catalog.get(RIGHT_HALL).unwrap();
        assert!(right.contains(positions[1]) && right.contains(positions[3]));
    }

    #[test]
    fn test_missing_halls_fall_back_to_largest() {
        let catalog = ZoneCatalog::new(vec![Zone::new("yard", "Yard", 0.0, 0.0, 400.0, 300.0)], 30.0)
            .unwrap();
        let roster = default_roster();
        for p in layout_positions(&roster, &catalog) {
            assert!(catalog.contains(p));
        }
    }
}
