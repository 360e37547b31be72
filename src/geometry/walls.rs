//! Exterior wall synthesis.
//!
//! Walls exist only where a room's boundary faces the outside of its level.
//! Interior partitions are implied by adjacent rooms and never meshed, so
//! growing each room outward and subtracting the union of all rooms on the
//! level leaves exactly the exterior wall ribbon.

use glam::Vec2;

use crate::math::mesh::{extrude_polygon, MeshData};
use crate::math::polygon::{self, JoinStyle, Polygon2};
use crate::plan::Group;

use super::WALL_THICKNESS;

/// Wall construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct WallParams {
    pub thickness: f32,
    pub color: [f32; 3],
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            thickness: WALL_THICKNESS,
            color: [0.87, 0.84, 0.78],
        }
    }
}

/// Exterior wall mesh for one room.
#[derive(Clone, Debug)]
pub struct RoomWalls {
    pub group_id: u32,
    pub room_id: u32,
    pub mesh: MeshData,
}

/// Exterior wall footprint rings for one room: the room polygon grown by
/// the wall thickness, minus everything any room on the level occupies.
pub fn wall_rings(room_poly: &Polygon2, level_union: &[Polygon2], thickness: f32) -> Vec<Polygon2> {
    if room_poly.is_degenerate() {
        return Vec::new();
    }
    let grown = polygon::offset(std::slice::from_ref(room_poly), thickness, JoinStyle::Miter);
    polygon::difference(&grown, level_union)
}

/// Build exterior wall meshes for every room in a group.
///
/// Rooms entirely surrounded by other rooms produce no mesh, which is
/// valid: they have no exterior boundary.
pub fn synthesize(group: &Group, params: &WallParams) -> Vec<RoomWalls> {
    let room_polys: Vec<Polygon2> = group.rooms.iter().map(|r| r.absolute_polygon()).collect();
    let level_union = polygon::union_all(&room_polys);

    let mut out = Vec::new();
    for (room, poly) in group.rooms.iter().zip(&room_polys) {
        let rings = wall_rings(poly, &level_union, params.thickness);
        if rings.is_empty() {
            continue;
        }
        let base = room.resolved_elevation(group);
        let top = room.ceiling_elevation(group);

        let (outers, holes): (Vec<Polygon2>, Vec<Polygon2>) =
            rings.into_iter().partition(|p| p.is_outer());

        let mut mesh = MeshData::new();
        for outer in &outers {
            let own_holes: Vec<Polygon2> = holes
                .iter()
                .filter(|h| !h.points.is_empty() && outer.contains_point(probe(h)))
                .cloned()
                .collect();
            mesh.merge(&extrude_polygon(outer, &own_holes, base, top, params.color));
        }
        if !mesh.is_empty() {
            out.push(RoomWalls {
                group_id: group.id,
                room_id: room.id,
                mesh,
            });
        }
    }
    out
}

fn probe(ring: &Polygon2) -> Vec2 {
    ring.points[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
