//! Canopy envelope: a deformed icosphere with a lens-profile silhouette.

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};

use crate::math::mesh::{icosphere, MeshData, Vertex};
use crate::plan::TreeKind;

use super::rng::TreeRng;

/// Horizontal radius never pinches below this fraction of the nominal
/// radius, so the trunk tip stays covered at the band ends.
const MIN_RADIUS_FRAC: f32 = 0.12;
const NOISE_FREQ: f64 = 1.7;
const NOISE_AMP: f32 = 0.10;

#[derive(Clone, Copy, Debug)]
pub struct CanopyParams {
    pub subdivisions: u32,
    /// Amplitudes of the two sinusoidal lobe frequencies.
    pub lobe_amps: [f32; 2],
}

impl Default for CanopyParams {
    fn default() -> Self {
        Self {
            subdivisions: 2,
            lobe_amps: [0.08, 0.05],
        }
    }
}

/// Vertical band the canopy occupies, as (center, half_extent) in absolute
/// height units. Oval trees stretch the band lower down the trunk.
fn height_band(kind: TreeKind, height: f32) -> (f32, f32) {
    match kind {
        TreeKind::Oval => (height * 0.60, height * 0.40),
        _ => (height * 0.70, height * 0.30),
    }
}

/// Build the canopy mesh in tree-local space (origin at the trunk base,
/// +Y up). Radius at each sphere vertex follows the closed-form profile
/// `sqrt(max(0, 1 - t^2))` over the height band, perturbed by sinusoidal
/// lobes and noise.
pub fn build(
    kind: TreeKind,
    height: f32,
    diameter: f32,
    rng: &mut TreeRng,
    params: &CanopyParams,
    color: [f32; 3],
) -> MeshData {
    let mut mesh = MeshData::new();
    if height <= 0.0 || diameter <= 0.0 {
        return mesh;
    }

    let radius = diameter * 0.5;
    let (center_y, half_band) = height_band(kind, height);
    let phase = [rng.range(0.0, std::f32::consts::TAU), rng.range(0.0, std::f32::consts::TAU)];
    let perlin = Perlin::new(rng.next_u32());

    let (positions, indices) = icosphere(params.subdivisions);
    for v in positions {
        let t = v.y.clamp(-1.0, 1.0);
        let horiz = Vec2::new(v.x, v.z);
        let y = center_y + t * half_band;

        let pos = if horiz.length_squared() < 1e-8 {
            // Pole vertices sit on the axis
            Vec3::new(0.0, y, 0.0)
        } else {
            let theta = horiz.y.atan2(horiz.x);
            let lobe = 1.0
                + params.lobe_amps[0] * (3.0 * theta + phase[0]).sin()
                + params.lobe_amps[1] * (5.0 * theta + phase[1]).sin();
            let n = perlin.get([
                v.x as f64 * NOISE_FREQ,
                v.y as f64 * NOISE_FREQ,
                v.z as f64 * NOISE_FREQ,
            ]) as f32
                * NOISE_AMP;
            let profile = (1.0 - t * t).max(0.0).sqrt();
            let r = (radius * profile * (lobe + n)).max(radius * MIN_RADIUS_FRAC);
            Vec3::new(theta.cos() * r, y, theta.sin() * r)
        };

        mesh.vertices.push(Vertex {
            position: pos.to_array(),
            normal: [0.0, 1.0, 0.0],
            color,
        });
    }
    mesh.indices = indices;
    mesh.compute_smooth_normals();
    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn canopy(kind: TreeKind, seed: u32) -> MeshData {
        build(
            kind,
            100.0,
            60.0,
            &mut TreeRng::new(seed),
            &CanopyParams::default(),
            [0.2, 0.4, 0.15],
        )
    }

    #[test]
    fn test_round_canopy_occupies_upper_band() {
        let mesh = canopy(TreeKind::Round, 1);
        let aabb = mesh.aabb();
        assert!((aabb.min.y - 40.0).abs() < 1.0, "band bottom {}", aabb.min.y);
        assert!((aabb.max.y - 100.0).abs() < 1.0, "band top {}", aabb.max.y);
    }

    #[test]
    fn test_oval_band_reaches_lower() {
        let round = canopy(TreeKind::Round, 1).aabb();
        let oval = canopy(TreeKind::Oval, 1).aabb();
        assert!(oval.min.y < round.min.y, "oval band stretches lower");
        assert!((oval.max.y - round.max.y).abs() < 1.0, "same top");
    }

    #[test]
    fn test_radius_bounded_by_perturbed_nominal() {
        let mesh = canopy(TreeKind::Round, 5);
        for v in &mesh.vertices {
            let r = (v.position[0] * v.position[0] + v.position[2] * v.position[2]).sqrt();
            assert!(r <= 30.0 * (1.0 + 0.08 + 0.05 + NOISE_AMP) + 1e-3, "r = {r}");
        }
    }

    #[test]
    fn test_min_radius_floor_near_band_ends() {
        let mesh = canopy(TreeKind::Round, 2);
        // Vertices near the band ends (but off the poles) keep a minimum
        // horizontal radius.
        for v in &mesh.vertices {
            let r = (v.position[0] * v.position[0] + v.position[2] * v.position[2]).sqrt();
            if r > 1e-3 {
                assert!(r >= 30.0 * MIN_RADIUS_FRAC - 1e-3, "pinched to r = {r}");
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = canopy(TreeKind::Round, 9);
        let b = canopy(TreeKind::Round, 9);
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert_eq!(va.position, vb.position);
        }
    }

    #[test]
    fn test_degenerate_dimensions_yield_empty() {
        let mesh = build(
            TreeKind::Round,
            0.0,
            60.0,
            &mut TreeRng::new(1),
            &CanopyParams::default(),
            [0.0; 3],
        );
        assert!(mesh.is_empty());
    }
}
