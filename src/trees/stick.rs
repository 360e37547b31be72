//! Stick primitive: a tapered, gently bent cylinder.
//!
//! The same primitive builds trunks and every branch order. Bend comes
//! from a short 2D random walk sampled at fixed height fractions; each
//! vertex ring is displaced by the interpolated walk offset and scaled by
//! the taper profile.

use glam::{Quat, Vec2, Vec3};

use crate::math::mesh::{MeshData, Vertex};

use super::rng::TreeRng;

/// Number of random-walk control points along the stick.
const CONTROL_POINTS: usize = 4;

#[derive(Clone, Copy, Debug)]
pub struct StickParams {
    pub length: f32,
    pub base_radius: f32,
    pub tip_radius: f32,
    /// Maximum sideways drift per control step, as a fraction of length.
    pub bend: f32,
    /// Height fraction where the linear taper begins; constant radius below.
    pub taper_start: f32,
    /// Rings along the length (segments + 1 rings are emitted).
    pub segments: usize,
    /// Vertices per ring.
    pub sides: usize,
}

impl Default for StickParams {
    fn default() -> Self {
        Self {
            length: 50.0,
            base_radius: 2.5,
            tip_radius: 0.6,
            bend: 0.04,
            taper_start: 0.3,
            segments: 6,
            sides: 8,
        }
    }
}

fn taper(params: &StickParams, t: f32) -> f32 {
    if t <= params.taper_start {
        params.base_radius
    } else {
        let u = (t - params.taper_start) / (1.0 - params.taper_start);
        params.base_radius + (params.tip_radius - params.base_radius) * u
    }
}

/// Interpolated random-walk offset at height fraction `t`.
fn curve_offset(controls: &[Vec2], t: f32) -> Vec2 {
    let last = controls.len() - 1;
    let pos = t.clamp(0.0, 1.0) * last as f32;
    let i = (pos as usize).min(last - 1);
    let frac = pos - i as f32;
    controls[i].lerp(controls[i + 1], frac)
}

/// Build a stick along local +Y starting at the origin.
pub fn stick_mesh(params: &StickParams, rng: &mut TreeRng, color: [f32; 3]) -> MeshData {
    stick_mesh_oriented(params, rng, Vec3::ZERO, Vec3::Y, color)
}

/// Build a stick from `origin` along `direction`.
pub fn stick_mesh_oriented(
    params: &StickParams,
    rng: &mut TreeRng,
    origin: Vec3,
    direction: Vec3,
    color: [f32; 3],
) -> MeshData {
    let mut mesh = MeshData::new();
    if params.length <= 0.0 || params.segments == 0 || params.sides < 3 {
        return mesh;
    }

    // Bounded random walk: the base stays anchored, drift accumulates.
    let step = params.bend * params.length;
    let mut controls = vec![Vec2::ZERO; CONTROL_POINTS];
    for i in 1..CONTROL_POINTS {
        let drift = Vec2::new(rng.range(-step, step), rng.range(-step, step));
        controls[i] = controls[i - 1] + drift;
    }

    let rotation = Quat::from_rotation_arc(Vec3::Y, direction.normalize_or_zero());

    let rings = params.segments + 1;
    for ring in 0..rings {
        let t = ring as f32 / params.segments as f32;
        let offset = curve_offset(&controls, t);
        let radius = taper(params, t).max(0.01);
        let center = Vec3::new(offset.x, t * params.length, offset.y);
        for side in 0..params.sides {
            let angle = side as f32 / params.sides as f32 * std::f32::consts::TAU;
            let local = center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
            let normal = rotation * Vec3::new(angle.cos(), 0.0, angle.sin());
            mesh.vertices.push(Vertex {
                position: (origin + rotation * local).to_array(),
                normal: normal.to_array(),
                color,
            });
        }
    }

    let sides = params.sides as u32;
    for ring in 0..params.segments as u32 {
        let a0 = ring * sides;
        let b0 = (ring + 1) * sides;
        for side in 0..sides {
            let next = (side + 1) % sides;
            mesh.indices.extend_from_slice(&[
                a0 + side,
                b0 + side,
                b0 + next,
                a0 + side,
                b0 + next,
                a0 + next,
            ]);
        }
    }

    // Tip cap so thin branches do not show an open tube end.
    let tip_offset = curve_offset(&controls, 1.0);
    let tip = origin + rotation * Vec3::new(tip_offset.x, params.length, tip_offset.y);
    let tip_index = mesh.vertices.len() as u32;
    mesh.vertices.push(Vertex {
        position: tip.to_array(),
        normal: (rotation * Vec3::Y).to_array(),
        color,
    });
    let top_ring = params.segments as u32 * sides;
    for side in 0..sides {
        let next = (side + 1) % sides;
        mesh.indices
            .extend_from_slice(&[top_ring + side, tip_index, top_ring + next]);
    }

    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_vertex_and_triangle_counts() {
        let params = StickParams {
            segments: 6,
            sides: 8,
            ..Default::default()
        };
        let mesh = stick_mesh(&params, &mut TreeRng::new(1), [0.4, 0.3, 0.2]);
        assert_eq!(mesh.vertex_count(), 7 * 8 + 1);
        assert_eq!(mesh.triangle_count(), 6 * 8 * 2 + 8);
    }

    #[test]
    fn test_stick_spans_its_length() {
        let params = StickParams {
            length: 40.0,
            bend: 0.0,
            ..Default::default()
        };
        let mesh = stick_mesh(&params, &mut TreeRng::new(1), [0.0; 3]);
        let aabb = mesh.aabb();
        assert!((aabb.max.y - 40.0).abs() < 1e-4);
        assert!(aabb.min.y.abs() < 1e-4);
    }

    #[test]
    fn test_taper_constant_then_linear() {
        let params = StickParams {
            base_radius: 4.0,
            tip_radius: 1.0,
            taper_start: 0.5,
            ..Default::default()
        };
        assert_eq!(taper(&params, 0.0), 4.0);
        assert_eq!(taper(&params, 0.5), 4.0);
        assert!((taper(&params, 0.75) - 2.5).abs() < 1e-5);
        assert!((taper(&params, 1.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bend_stays_bounded() {
        let params = StickParams {
            length: 100.0,
            bend: 0.05,
            ..Default::default()
        };
        let mesh = stick_mesh(&params, &mut TreeRng::new(3), [0.0; 3]);
        let aabb = mesh.aabb();
        // Drift over 3 steps of at most 5 units each, plus the radius
        let max_drift = 3.0 * 5.0 + params.base_radius + 0.5;
        assert!(aabb.max.x.abs() < max_drift && aabb.min.x.abs() < max_drift);
        assert!(aabb.max.z.abs() < max_drift && aabb.min.z.abs() < max_drift);
    }

    #[test]
    fn test_oriented_stick_points_along_direction() {
        let params = StickParams {
            length: 30.0,
            bend: 0.0,
            ..Default::default()
        };
        let mesh = stick_mesh_oriented(
            &params,
            &mut TreeRng::new(1),
            Vec3::new(5.0, 10.0, 0.0),
            Vec3::X,
            [0.0; 3],
        );
        let aabb = mesh.aabb();
        assert!((aabb.max.x - 35.0).abs() < 0.5, "tip reaches along +X");
        assert!((aabb.min.x - 5.0).abs() < params.base_radius + 0.5);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let params = StickParams::default();
        let a = stick_mesh(&params, &mut TreeRng::new(11), [0.0; 3]);
        let b = stick_mesh(&params, &mut TreeRng::new(11), [0.0; 3]);
        assert_eq!(a.vertex_count(), b.vertex_count());
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert_eq!(va.position, vb.position);
        }
    }
}
