//! Roof synthesis over exposed ceiling areas.
//!
//! Flat roofs are plain extruded slabs. Hip roofs come from the straight
//! skeleton: every skeleton face lifts its interior vertices by their
//! boundary distance times the pitch ratio, giving the classic ridge-and-hip
//! silhouette for any simple footprint.

use glam::Vec3;

use crate::math::mesh::{extrude_polygon, MeshData, Vertex};
use crate::math::plan_to_world;
use crate::math::polygon::{self, JoinStyle, Polygon2};
use crate::plan::RoofStyle;

use super::exposure::ExposedCeilingArea;
use super::skeleton::straight_skeleton;

/// Roof construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct RoofParams {
    pub style: RoofStyle,
    /// Horizontal eave overhang past the wall face, plan units.
    pub overhang: f32,
    /// Rise per unit of horizontal distance from the eave.
    pub pitch_ratio: f32,
    /// Vertical thickness of flat slabs and the hip base skirt.
    pub slab_thickness: f32,
    /// Simplification tolerance applied before skeleton construction.
    pub simplify_tolerance: f32,
    pub color: [f32; 3],
}

impl Default for RoofParams {
    fn default() -> Self {
        Self {
            style: RoofStyle::Hip,
            overhang: 12.0,
            pitch_ratio: 0.5,
            slab_thickness: 4.0,
            simplify_tolerance: 0.5,
            color: [0.35, 0.23, 0.20],
        }
    }
}

/// Build roof meshes for every exposed ceiling area.
///
/// Degenerate exposure polygons yield no mesh. A skeleton failure on one
/// polygon downgrades only that polygon to a flat slab.
pub fn synthesize(exposed: &[ExposedCeilingArea], params: &RoofParams) -> Vec<MeshData> {
    let mut out = Vec::new();
    for area in exposed {
        let (outers, holes): (Vec<&Polygon2>, Vec<&Polygon2>) = area
            .polygons
            .iter()
            .filter(|p| !p.is_degenerate())
            .partition(|p| p.is_outer());

        for outer in outers {
            let own_holes: Vec<Polygon2> = holes
                .iter()
                .filter(|h| outer.contains_point(h.points[0]))
                .map(|&h| h.clone())
                .collect();

            let mesh = match params.style {
                RoofStyle::Flat => flat_roof(outer, &own_holes, area.ceiling_z, params),
                RoofStyle::Hip => {
                    if own_holes.is_empty() {
                        hip_roof(outer, area.ceiling_z, params).unwrap_or_else(|e| {
                            log::warn!(
                                "hip roof failed over ceiling at {}, falling back to flat: {e}",
                                area.ceiling_z
                            );
                            flat_roof(outer, &[], area.ceiling_z, params)
                        })
                    } else {
                        // The skeleton handles simple polygons only
                        log::warn!(
                            "exposed area at {} has a courtyard hole, using flat roof",
                            area.ceiling_z
                        );
                        flat_roof(outer, &own_holes, area.ceiling_z, params)
                    }
                }
            };
            if !mesh.is_empty() {
                out.push(mesh);
            }
        }
    }
    out
}

/// Flat slab: footprint grown by the overhang, top face flush with the
/// ceiling so the slab caps the walls from above.
fn flat_roof(
    outer: &Polygon2,
    holes: &[Polygon2],
    ceiling_z: f32,
    params: &RoofParams,
) -> MeshData {
    let mut rings = vec![outer.clone()];
    rings.extend_from_slice(holes);
    let grown = polygon::offset(&rings, params.overhang, JoinStyle::Miter);
    let (outers, grown_holes): (Vec<Polygon2>, Vec<Polygon2>) =
        grown.into_iter().partition(|p| p.is_outer());

    let mut mesh = MeshData::new();
    for o in &outers {
        let own: Vec<Polygon2> = grown_holes
            .iter()
            .filter(|h| o.contains_point(h.points[0]))
            .cloned()
            .collect();
        mesh.merge(&extrude_polygon(
            o,
            &own,
            ceiling_z - params.slab_thickness,
            ceiling_z,
            params.color,
        ));
    }
    mesh
}

/// Hip roof from the straight skeleton of the overhang footprint.
fn hip_roof(outer: &Polygon2, ceiling_z: f32, params: &RoofParams) -> crate::core::Result<MeshData> {
    let simplified = polygon::simplify(outer, params.simplify_tolerance);
    let footprint = polygon::offset(
        std::slice::from_ref(&simplified),
        params.overhang,
        JoinStyle::Miter,
    )
    .into_iter()
    .filter(|p| p.is_outer())
    .max_by(|a, b| a.signed_area().total_cmp(&b.signed_area()))
    .unwrap_or(simplified);

    let skeleton = straight_skeleton(&footprint)?;

    let mut mesh = MeshData::new();
    for face in &skeleton.faces {
        // Ridge endpoints can coincide with boundary collapse points;
        // drop consecutive duplicates so the fan has no zero-area blades.
        let mut ring: Vec<usize> = Vec::with_capacity(face.len());
        for &idx in face {
            let p = skeleton.nodes[idx].position;
            let dup = ring
                .last()
                .is_some_and(|&l| skeleton.nodes[l].position.distance(p) < 1e-3);
            if !dup {
                ring.push(idx);
            }
        }
        while ring.len() > 1
            && skeleton.nodes[ring[0]]
                .position
                .distance(skeleton.nodes[ring[ring.len() - 1]].position)
                < 1e-3
        {
            ring.pop();
        }
        if ring.len() < 3 {
            continue;
        }

        let world: Vec<Vec3> = ring
            .iter()
            .map(|&idx| {
                let node = &skeleton.nodes[idx];
                plan_to_world(node.position, ceiling_z + node.time * params.pitch_ratio)
            })
            .collect();

        // Skeleton faces are planar; one normal per face, flipped upward.
        let mut normal = Vec3::ZERO;
        for i in 0..world.len() {
            let a = world[i];
            let b = world[(i + 1) % world.len()];
            normal += a.cross(b);
        }
        let flip = normal.y < 0.0;
        let normal = if flip { -normal } else { normal }.normalize_or_zero();

        let base = mesh.vertices.len() as u32;
        for &p in &world {
            mesh.vertices.push(Vertex {
                position: p.to_array(),
                normal: normal.to_array(),
                color: params.color,
            });
        }
        for i in 1..world.len() as u32 - 1 {
            if flip {
                mesh.indices.extend_from_slice(&[base, base + i + 1, base + i]);
            } else {
                mesh.indices.extend_from_slice(&[base, base + i, base + i + 1]);
            }
        }
    }

    // Skirt slab closes the underside and eave edge.
    if params.slab_thickness > 0.0 {
        mesh.merge(&extrude_polygon(
            &footprint,
            &[],
            ceiling_z - params.slab_thickness,
            ceiling_z,
            params.color,
        ));
    }
    Ok(mesh)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn rect(w: f32, h: f32) -> Polygon2 {
        Polygon2::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(w, 0.0),
            Vec2::new(w, h),
            Vec2::new(0.0, h),
        ])
    }

    fn exposed(polygons: Vec<Polygon2>, ceiling_z: f32) -> Vec<ExposedCeilingArea> {
        vec![ExposedCeilingArea {
            ceiling_z,
            polygons,
        }]
    }

    #[test]
    fn test_flat_roof_slab_extents() {
        let params = RoofParams {
            style: RoofStyle::Flat,
            ..Default::default()
        };
        let meshes = synthesize(&exposed(vec![rect(100.0, 100.0)], 96.0), &params);
        assert_eq!(meshes.len(), 1);
        let aabb = meshes[0].aabb();
        assert!((aabb.max.y - 96.0).abs() < 1e-4, "top at ceiling");
        assert!((aabb.min.y - 92.0).abs() < 1e-4, "slab thickness below");
        // 100 + 2 x 12 overhang
        assert!((aabb.max.x - aabb.min.x - 124.0).abs() < 0.5);
    }

    #[test]
    fn test_hip_roof_square_peak() {
        // 120x120 square with 12 overhang: 144x144 footprint, peak at
        // inset 72 above the eave line.
        let params = RoofParams::default();
        let meshes = synthesize(&exposed(vec![rect(120.0, 120.0)], 96.0), &params);
        assert_eq!(meshes.len(), 1);
        let aabb = meshes[0].aabb();
        let expected_peak = 96.0 + 72.0 * params.pitch_ratio;
        assert!(
            (aabb.max.y - expected_peak).abs() < 0.5,
            "peak {} != {expected_peak}",
            aabb.max.y
        );
        assert!((aabb.min.y - 92.0).abs() < 1e-4, "skirt base");
        assert!(meshes[0].triangle_count() >= 4, "four hip faces at minimum");
    }

    #[test]
    fn test_hip_roof_rectangle_ridge() {
        // 300x100 exposed area: ridge at half-width rise
        let params = RoofParams {
            overhang: 0.0,
            ..Default::default()
        };
        let meshes = synthesize(&exposed(vec![rect(300.0, 100.0)], 96.0), &params);
        assert_eq!(meshes.len(), 1);
        let peak = meshes[0].aabb().max.y;
        assert!((peak - (96.0 + 50.0 * 0.5)).abs() < 0.5, "peak = {peak}");
    }

    #[test]
    fn test_roof_normals_point_upward() {
        let meshes = synthesize(
            &exposed(vec![rect(120.0, 120.0)], 96.0),
            &RoofParams {
                overhang: 0.0,
                slab_thickness: 0.0,
                ..Default::default()
            },
        );
        // Slab is zero-thickness so only sloped faces remain
        for v in &meshes[0].vertices {
            assert!(v.normal[1] > 0.0, "roof face normal {:?}", v.normal);
        }
    }

    #[test]
    fn test_degenerate_polygon_yields_no_mesh() {
        let sliver = Polygon2::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.1),
        ]);
        let meshes = synthesize(&exposed(vec![sliver], 96.0), &RoofParams::default());
        assert!(meshes.is_empty());
        let empty = synthesize(&exposed(vec![], 96.0), &RoofParams::default());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_degenerate_hole_rings_are_ignored() {
        let empty_ring = Polygon2::new(vec![]);
        let mut sliver = Polygon2::new(vec![
            Vec2::new(30.0, 30.0),
            Vec2::new(31.0, 30.0),
            Vec2::new(31.0, 30.1),
        ]);
        sliver.points.reverse(); // hole orientation, but below the area epsilon
        let meshes = synthesize(
            &exposed(vec![rect(120.0, 120.0), empty_ring, sliver], 96.0),
            &RoofParams::default(),
        );
        assert_eq!(meshes.len(), 1);
        // Junk rings must not demote the hip roof to a flat slab
        assert!(meshes[0].aabb().max.y > 96.0 + 1.0);
    }

    #[test]
    fn test_courtyard_falls_back_to_flat() {
        let mut hole = rect(40.0, 40.0).translated(Vec2::new(30.0, 30.0));
        hole.points.reverse(); // negative area = hole
        let meshes = synthesize(
            &exposed(vec![rect(100.0, 100.0), hole], 96.0),
            &RoofParams::default(),
        );
        assert_eq!(meshes.len(), 1);
        // Flat fallback keeps everything at or below the ceiling
        assert!(meshes[0].aabb().max.y <= 96.0 + 1e-4);
    }
}
