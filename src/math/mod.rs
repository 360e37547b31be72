//! Math primitives shared across the engine.

pub mod aabb;
pub mod mesh;
pub mod polygon;
pub mod ray;

pub use aabb::Aabb;
pub use mesh::{MeshData, Vertex};
pub use polygon::Polygon2;
pub use ray::Ray;

use glam::{Vec2, Vec3};

/// Map a plan-space point plus an elevation to world space.
///
/// Plan space is 2D (x, y) with elevation as a separate scalar; world space
/// is Y-up. This is the single place the axis convention is applied — the
/// whole 2D pipeline stays in plan space and only mesh construction crosses
/// this boundary.
#[inline]
pub fn plan_to_world(p: Vec2, elevation: f32) -> Vec3 {
    Vec3::new(p.x, elevation, p.y)
}
