//! Pointer-hover picking over interactive room meshes.
//!
//! Only room floor meshes are registered; walls, roofs, surfaces, and
//! environment geometry never participate in hover.

use glam::Vec3;

use crate::math::{Aabb, MeshData, Ray};

/// Result of a successful room pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveRoom {
    pub group_id: u32,
    pub room_id: u32,
    pub distance: f32,
}

/// Flat caps have zero thickness; a little padding keeps the slab test
/// from rejecting them on float noise.
fn inflated(aabb: Aabb, amount: f32) -> Aabb {
    Aabb::new(aabb.min - Vec3::splat(amount), aabb.max + Vec3::splat(amount))
}

struct RoomTarget {
    group_id: u32,
    room_id: u32,
    aabb: Aabb,
    mesh: MeshData,
}

/// Interactive mesh registry with nearest-hit picking.
#[derive(Default)]
pub struct RoomPicker {
    targets: Vec<RoomTarget>,
}

impl RoomPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, group_id: u32, room_id: u32, mesh: MeshData) {
        if mesh.is_empty() {
            return;
        }
        self.targets.push(RoomTarget {
            group_id,
            room_id,
            aabb: inflated(mesh.aabb(), 0.1),
            mesh,
        });
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Nearest room hit by the ray, if any.
    pub fn pick(&self, ray: &Ray) -> Option<ActiveRoom> {
        let mut best: Option<ActiveRoom> = None;
        for target in &self.targets {
            if ray.intersects_aabb(&target.aabb).is_none() {
                continue;
            }
            for tri in target.mesh.indices.chunks_exact(3) {
                let a = Vec3::from_array(target.mesh.vertices[tri[0] as usize].position);
                let b = Vec3::from_array(target.mesh.vertices[tri[1] as usize].position);
                let c = Vec3::from_array(target.mesh.vertices[tri[2] as usize].position);
                if let Some(t) = ray.intersects_triangle(a, b, c) {
                    if best.is_none_or(|h| t < h.distance) {
                        best = Some(ActiveRoom {
                            group_id: target.group_id,
                            room_id: target.room_id,
                            distance: t,
                        });
                    }
                }
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mesh::polygon_cap;
    use crate::math::polygon::Polygon2;
    use glam::{Vec2, Vec3};

    fn floor(origin: Vec2, size: f32, elevation: f32) -> MeshData {
        polygon_cap(
            &Polygon2::new(vec![
                origin,
                origin + Vec2::new(size, 0.0),
                origin + Vec2::new(size, size),
                origin + Vec2::new(0.0, size),
            ]),
            &[],
            elevation,
            true,
            [1.0; 3],
        )
    }

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 100.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn test_pick_hits_room_under_pointer() {
        let mut picker = RoomPicker::new();
        picker.register(1, 10, floor(Vec2::ZERO, 50.0, 0.0));
        picker.register(1, 11, floor(Vec2::new(60.0, 0.0), 50.0, 0.0));
        let hit = picker.pick(&down_ray(25.0, 25.0)).unwrap();
        assert_eq!(hit.room_id, 10);
        assert!((hit.distance - 100.0).abs() < 1e-3);
        let hit2 = picker.pick(&down_ray(85.0, 25.0)).unwrap();
        assert_eq!(hit2.room_id, 11);
    }

    #[test]
    fn test_pick_misses_outside_rooms() {
        let mut picker = RoomPicker::new();
        picker.register(1, 10, floor(Vec2::ZERO, 50.0, 0.0));
        assert!(picker.pick(&down_ray(200.0, 200.0)).is_none());
    }

    #[test]
    fn test_pick_returns_nearest_of_stacked_rooms() {
        let mut picker = RoomPicker::new();
        picker.register(1, 10, floor(Vec2::ZERO, 50.0, 0.0));
        picker.register(2, 20, floor(Vec2::ZERO, 50.0, 96.0));
        let hit = picker.pick(&down_ray(25.0, 25.0)).unwrap();
        assert_eq!(hit.room_id, 20, "upper floor is nearer to the pointer");
    }

    #[test]
    fn test_clear_empties_registry() {
        let mut picker = RoomPicker::new();
        picker.register(1, 10, floor(Vec2::ZERO, 50.0, 0.0));
        assert_eq!(picker.len(), 1);
        picker.clear();
        assert!(picker.is_empty());
        assert!(picker.pick(&down_ray(25.0, 25.0)).is_none());
    }
}
