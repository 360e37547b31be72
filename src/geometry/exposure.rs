//! Ceiling exposure solver.
//!
//! Determines, per distinct ceiling elevation, which ceiling area is not
//! covered by any floor above it. Only exposed areas need roof geometry.

use crate::math::polygon::{self, Polygon2};
use crate::plan::FloorPlanDocument;

/// Exposed ceiling area at one elevation. Derived and transient: recomputed
/// whenever geometry changes, never persisted.
#[derive(Clone, Debug)]
pub struct ExposedCeilingArea {
    pub ceiling_z: f32,
    pub polygons: Vec<Polygon2>,
}

/// Quantized elevation key so float noise cannot split one level in two.
fn level_key(z: f32) -> i64 {
    (z * 1000.0).round() as i64
}

/// Compute exposed ceiling areas for the whole document.
///
/// Rooms are bucketed by ceiling elevation (floor elevation + height) and
/// the distinct levels are processed top-down: the highest level is fully
/// exposed, and each lower level keeps only what the union of all higher
/// levels does not cover. Below-grade levels are skipped. A document with
/// zero rooms yields an empty result.
pub fn solve(doc: &FloorPlanDocument) -> Vec<ExposedCeilingArea> {
    let mut buckets: Vec<(i64, f32, Vec<Polygon2>)> = Vec::new();
    for (group, room) in doc.all_rooms() {
        let ceiling_z = room.ceiling_elevation(group);
        if ceiling_z <= 0.0 {
            continue; // below grade, never visible from outside
        }
        let poly = room.absolute_polygon();
        if poly.is_degenerate() {
            continue;
        }
        let key = level_key(ceiling_z);
        match buckets.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, polys)) => polys.push(poly),
            None => buckets.push((key, ceiling_z, vec![poly])),
        }
    }

    // Highest ceiling first: nothing occludes it.
    buckets.sort_by(|a, b| b.0.cmp(&a.0));

    let mut covered: Vec<Polygon2> = Vec::new();
    let mut result = Vec::new();
    for (_, ceiling_z, polys) in buckets {
        let own = polygon::union_all(&polys);
        let exposed = if covered.is_empty() {
            own.clone()
        } else {
            polygon::difference(&own, &covered)
        };
        result.push(ExposedCeilingArea {
            ceiling_z,
            polygons: exposed,
        });
        covered.extend(own);
        covered = polygon::union_all(&covered);
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Group, PlanPoint, Room};

    fn room(id: u32, x: f32, y: f32, w: f32, h: f32) -> Room {
        Room {
            id,
            x,
            y,
            points: vec![
                PlanPoint { x: 0.0, y: 0.0 },
                PlanPoint { x: w, y: 0.0 },
                PlanPoint { x: w, y: h },
                PlanPoint { x: 0.0, y: h },
            ],
            ..Default::default()
        }
    }

    fn doc(groups: Vec<Group>) -> FloorPlanDocument {
        FloorPlanDocument {
            groups,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_document_yields_empty_result() {
        let d = doc(vec![]);
        assert!(solve(&d).is_empty());
    }

    #[test]
    fn test_single_room_fully_exposed() {
        let d = doc(vec![Group {
            id: 1,
            elevation: 0.0,
            height: Some(96.0),
            rooms: vec![room(1, 0.0, 0.0, 120.0, 120.0)],
            ..Default::default()
        }]);
        let exposed = solve(&d);
        assert_eq!(exposed.len(), 1);
        assert_eq!(exposed[0].ceiling_z, 96.0);
        assert_eq!(exposed[0].polygons.len(), 1);
        assert!((exposed[0].polygons[0].signed_area() - 120.0 * 120.0).abs() < 10.0);
    }

    #[test]
    fn test_upper_floor_occludes_lower_ceiling() {
        // Ground floor 200x100, upper floor 100x100 sitting on its left half
        let d = doc(vec![
            Group {
                id: 1,
                elevation: 0.0,
                height: Some(96.0),
                rooms: vec![room(1, 0.0, 0.0, 200.0, 100.0)],
                ..Default::default()
            },
            Group {
                id: 2,
                elevation: 96.0,
                height: Some(96.0),
                rooms: vec![room(2, 0.0, 0.0, 100.0, 100.0)],
                ..Default::default()
            },
        ]);
        let exposed = solve(&d);
        assert_eq!(exposed.len(), 2);
        // Topmost level first and fully exposed
        assert_eq!(exposed[0].ceiling_z, 192.0);
        let top_area: f32 = exposed[0].polygons.iter().map(|p| p.signed_area()).sum();
        assert!((top_area - 100.0 * 100.0).abs() < 10.0);
        // Ground ceiling only exposed on the right half
        assert_eq!(exposed[1].ceiling_z, 96.0);
        let low_area: f32 = exposed[1].polygons.iter().map(|p| p.signed_area()).sum();
        assert!((low_area - 100.0 * 100.0).abs() < 10.0, "area = {low_area}");
    }

    #[test]
    fn test_fully_covered_lower_level_has_no_exposure() {
        let d = doc(vec![
            Group {
                id: 1,
                elevation: 0.0,
                height: Some(96.0),
                rooms: vec![room(1, 0.0, 0.0, 100.0, 100.0)],
                ..Default::default()
            },
            Group {
                id: 2,
                elevation: 96.0,
                height: Some(96.0),
                rooms: vec![room(2, 0.0, 0.0, 100.0, 100.0)],
                ..Default::default()
            },
        ]);
        let exposed = solve(&d);
        assert_eq!(exposed.len(), 2);
        assert!(exposed[1].polygons.is_empty());
    }

    #[test]
    fn test_below_grade_rooms_skipped() {
        let d = doc(vec![Group {
            id: 1,
            elevation: -96.0,
            height: Some(90.0),
            rooms: vec![room(1, 0.0, 0.0, 100.0, 100.0)],
            ..Default::default()
        }]);
        assert!(solve(&d).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let d = doc(vec![
            Group {
                id: 1,
                elevation: 0.0,
                height: Some(96.0),
                rooms: vec![room(1, 0.0, 0.0, 200.0, 100.0), room(2, 150.0, 0.0, 100.0, 100.0)],
                ..Default::default()
            },
            Group {
                id: 2,
                elevation: 96.0,
                height: Some(96.0),
                rooms: vec![room(3, 20.0, 20.0, 60.0, 60.0)],
                ..Default::default()
            },
        ]);
        let a = solve(&d);
        let b = solve(&d);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.ceiling_z, y.ceiling_z);
            assert_eq!(x.polygons.len(), y.polygons.len());
            for (p, q) in x.polygons.iter().zip(&y.polygons) {
                assert_eq!(p.points, q.points);
            }
        }
    }
}
