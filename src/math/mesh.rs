//! CPU-side triangle mesh data and builders.
//!
//! Meshes are stored ready for GPU upload: a flat `Pod` vertex buffer plus
//! `u32` indices. Plan-space polygons cross into world space here via
//! [`super::plan_to_world`].

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::aabb::Aabb;
use super::plan_to_world;
use super::polygon::Polygon2;

/// GPU-uploadable vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Triangle mesh with interleaved vertices and u32 indices.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, rebasing its indices.
    pub fn merge(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Translate all vertex positions.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position[0] += offset.x;
            v.position[1] += offset.y;
            v.position[2] += offset.z;
        }
    }

    /// Overwrite every vertex color.
    pub fn set_color(&mut self, color: [f32; 3]) {
        for v in &mut self.vertices {
            v.color = color;
        }
    }

    /// Bounding box over all vertex positions.
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in &self.vertices {
            aabb.expand(Vec3::from_array(v.position));
        }
        aabb
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Recompute smooth per-vertex normals from face normals.
    pub fn compute_smooth_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = Vec3::from_array(self.vertices[i0].position);
            let b = Vec3::from_array(self.vertices[i1].position);
            let c = Vec3::from_array(self.vertices[i2].position);
            // Cross product length weights by face area
            let n = (b - a).cross(c - a);
            accum[i0] += n;
            accum[i1] += n;
            accum[i2] += n;
        }
        for (v, n) in self.vertices.iter_mut().zip(accum) {
            v.normal = n.normalize_or_zero().to_array();
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Triangulate a polygon with holes into a horizontal cap at `elevation`.
///
/// `up` selects the face direction: true emits a +Y facing cap, false -Y.
pub fn polygon_cap(
    outer: &Polygon2,
    holes: &[Polygon2],
    elevation: f32,
    up: bool,
    color: [f32; 3],
) -> MeshData {
    let mut mesh = MeshData::new();
    if outer.points.len() < 3 {
        return mesh;
    }

    let mut coords: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();
    for p in &outer.points {
        coords.push(p.x as f64);
        coords.push(p.y as f64);
    }
    for hole in holes {
        hole_indices.push(coords.len() / 2);
        for p in &hole.points {
            coords.push(p.x as f64);
            coords.push(p.y as f64);
        }
    }

    let tri_indices = earcutr::earcut(&coords, &hole_indices, 2).unwrap_or_default();
    if tri_indices.is_empty() {
        return mesh;
    }

    let normal = if up { Vec3::Y } else { Vec3::NEG_Y };
    for xy in coords.chunks_exact(2) {
        let pos = plan_to_world(Vec2::new(xy[0] as f32, xy[1] as f32), elevation);
        mesh.vertices.push(Vertex {
            position: pos.to_array(),
            normal: normal.to_array(),
            color,
        });
    }

    for tri in tri_indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as u32, tri[1] as u32, tri[2] as u32);
        let a = Vec3::from_array(mesh.vertices[i0 as usize].position);
        let b = Vec3::from_array(mesh.vertices[i1 as usize].position);
        let c = Vec3::from_array(mesh.vertices[i2 as usize].position);
        let face = (b - a).cross(c - a);
        // Earcut winding depends on input orientation; enforce the face side
        if face.dot(normal) >= 0.0 {
            mesh.indices.extend_from_slice(&[i0, i1, i2]);
        } else {
            mesh.indices.extend_from_slice(&[i0, i2, i1]);
        }
    }
    mesh
}

/// Vertical quad strip along one polygon ring between two elevations.
///
/// Outward normals follow the ring winding: CCW outer rings face away from
/// the enclosed area, CW hole rings face into the hole.
pub fn ring_sides(ring: &Polygon2, base: f32, top: f32, color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::new();
    let n = ring.points.len();
    if n < 2 || (top - base).abs() < 1e-5 {
        return mesh;
    }
    for i in 0..n {
        let a = ring.points[i];
        let b = ring.points[(i + 1) % n];
        let d = b - a;
        if d.length_squared() < 1e-10 {
            continue;
        }
        let plan_normal = Vec2::new(d.y, -d.x).normalize();
        let normal = Vec3::new(plan_normal.x, 0.0, plan_normal.y).to_array();

        let base_idx = mesh.vertices.len() as u32;
        for (p, h) in [(a, base), (b, base), (b, top), (a, top)] {
            mesh.vertices.push(Vertex {
                position: plan_to_world(p, h).to_array(),
                normal,
                color,
            });
        }
        mesh.indices.extend_from_slice(&[
            base_idx,
            base_idx + 1,
            base_idx + 2,
            base_idx,
            base_idx + 2,
            base_idx + 3,
        ]);
    }
    mesh
}

/// Extrude a polygon with holes into a closed solid between two elevations.
pub fn extrude_polygon(
    outer: &Polygon2,
    holes: &[Polygon2],
    base: f32,
    top: f32,
    color: [f32; 3],
) -> MeshData {
    let mut mesh = polygon_cap(outer, holes, top, true, color);
    mesh.merge(&polygon_cap(outer, holes, base, false, color));
    mesh.merge(&ring_sides(outer, base, top, color));
    for hole in holes {
        mesh.merge(&ring_sides(hole, base, top, color));
    }
    mesh
}

/// Fan triangulation of a convex face with `n` vertices: (0, i, i+1).
pub fn fan_triangles(n: usize) -> Vec<[usize; 3]> {
    if n < 3 {
        return Vec::new();
    }
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

/// Unit icosphere positions and indices.
pub fn icosphere(subdivisions: u32) -> (Vec<Vec3>, Vec<u32>) {
    // Icosahedron seed
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut positions: Vec<Vec3> = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11,
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9,
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];

    for _ in 0..subdivisions {
        let mut midpoint_cache: std::collections::HashMap<(u32, u32), u32> =
            std::collections::HashMap::new();
        let mut next_indices = Vec::with_capacity(indices.len() * 4);
        let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoint_cache.entry(key).or_insert_with(|| {
                let m = ((positions[a as usize] + positions[b as usize]) * 0.5).normalize();
                positions.push(m);
                (positions.len() - 1) as u32
            })
        };
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let ab = midpoint(a, b, &mut positions);
            let bc = midpoint(b, c, &mut positions);
            let ca = midpoint(c, a, &mut positions);
            next_indices.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
        }
        indices = next_indices;
    }

    (positions, indices)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
