//! Free-standing surface slabs (patios, decks, paths).

use crate::math::mesh::{extrude_polygon, polygon_cap, MeshData};
use crate::plan::Group;

/// Lift applied to zero-height surfaces so they never z-fight the ground.
const FLAT_LIFT: f32 = 0.25;

/// Build meshes for every surface in a group. Zero-height surfaces become
/// a single upward-facing cap; positive heights extrude into a slab.
pub fn synthesize(group: &Group) -> Vec<MeshData> {
    let mut out = Vec::new();
    for surface in &group.surfaces {
        let poly = surface.absolute_polygon();
        if poly.is_degenerate() {
            continue;
        }
        let base = group.elevation;
        let mesh = if surface.height <= 0.0 {
            polygon_cap(&poly, &[], base + FLAT_LIFT, true, surface.color)
        } else {
            extrude_polygon(&poly, &[], base, base + surface.height, surface.color)
        };
        if !mesh.is_empty() {
            out.push(mesh);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanPoint, Surface};

    fn surface(height: f32) -> Surface {
        Surface {
            x: 10.0,
            y: 10.0,
            points: vec![
                PlanPoint { x: 0.0, y: 0.0 },
                PlanPoint { x: 80.0, y: 0.0 },
                PlanPoint { x: 80.0, y: 40.0 },
                PlanPoint { x: 0.0, y: 40.0 },
            ],
            height,
            color: [0.5, 0.5, 0.5],
        }
    }

    #[test]
    fn test_flat_surface_is_single_cap() {
        let group = Group {
            id: 1,
            surfaces: vec![surface(0.0)],
            ..Default::default()
        };
        let meshes = synthesize(&group);
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].triangle_count(), 2);
        let aabb = meshes[0].aabb();
        assert!((aabb.min.y - FLAT_LIFT).abs() < 1e-5);
        assert_eq!(aabb.min.y, aabb.max.y);
    }

    #[test]
    fn test_raised_surface_extrudes() {
        let group = Group {
            id: 1,
            elevation: 0.0,
            surfaces: vec![surface(12.0)],
            ..Default::default()
        };
        let meshes = synthesize(&group);
        assert_eq!(meshes.len(), 1);
        let aabb = meshes[0].aabb();
        assert_eq!(aabb.min.y, 0.0);
        assert_eq!(aabb.max.y, 12.0);
        assert_eq!(meshes[0].triangle_count(), 12);
    }

    #[test]
    fn test_degenerate_surface_skipped() {
        let mut s = surface(0.0);
        s.points.truncate(2);
        let group = Group {
            id: 1,
            surfaces: vec![s],
            ..Default::default()
        };
        assert!(synthesize(&group).is_empty());
    }
}
