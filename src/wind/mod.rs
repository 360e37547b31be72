//! Wind deformation.
//!
//! Registration snapshots each mesh's base vertex positions once; every
//! frame the deformed position is written as `base + displacement`, never
//! accumulated, so disabling wind (or zero speed) restores the registered
//! geometry exactly.

use std::collections::HashMap;

use crate::math::mesh::MeshData;

/// Exponent of the height weight curve: sway grows toward the free end.
const WEIGHT_POWER: f32 = 1.8;
/// Steady lean fraction per unit of wind speed.
const LEAN_PER_SPEED: f32 = 0.6;
/// Gust oscillation fraction per unit of wind speed.
const GUST_PER_SPEED: f32 = 0.4;
/// Low-frequency gust oscillator rates, radians per second.
const GUST_FREQ_PRIMARY: f32 = 0.9;
const GUST_FREQ_SECONDARY: f32 = 2.3;

/// Per-mesh registration parameters, typically taken from a tree part hint.
#[derive(Clone, Copy, Debug)]
pub struct WindMeshParams {
    /// World elevation of the mesh's fixed base.
    pub base_elevation: f32,
    /// Vertical extent over which the weight curve rises.
    pub height: f32,
    /// 0 = fully loose, 1 = rigid. Scales the gust component down.
    pub stiffness: f32,
    /// Tip displacement limit as a fraction of `height`.
    pub max_sway_ratio: f32,
}

struct Registration {
    base_positions: Vec<[f32; 3]>,
    /// Displacement amplitude in world units at each vertex.
    weights: Vec<f32>,
    phases: Vec<f32>,
    stiffness: f32,
}

/// Uniform-wind mesh deformer. One instance per scene.
#[derive(Default)]
pub struct WindSystem {
    registrations: HashMap<u64, Registration>,
}

impl WindSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a mesh's vertices and precompute per-vertex weight and
    /// phase. Re-registering an id replaces the previous snapshot.
    pub fn register(&mut self, mesh_id: u64, mesh: &MeshData, params: WindMeshParams) {
        let height = params.height.max(1e-3);
        let mut base_positions = Vec::with_capacity(mesh.vertices.len());
        let mut weights = Vec::with_capacity(mesh.vertices.len());
        let mut phases = Vec::with_capacity(mesh.vertices.len());
        for v in &mesh.vertices {
            let p = v.position;
            let frac = ((p[1] - params.base_elevation) / height).clamp(0.0, 1.0);
            base_positions.push(p);
            weights.push(frac.powf(WEIGHT_POWER) * params.max_sway_ratio * height);
            // Horizontal position decorrelates nearby vertices
            phases.push(p[0] * 0.05 + p[2] * 0.07);
        }
        self.registrations.insert(
            mesh_id,
            Registration {
                base_positions,
                weights,
                phases,
                stiffness: params.stiffness.clamp(0.0, 1.0),
            },
        );
    }

    pub fn is_registered(&self, mesh_id: u64) -> bool {
        self.registrations.contains_key(&mesh_id)
    }

    /// Drop every registration. Called before a structural rebuild.
    pub fn unregister_all(&mut self) {
        self.registrations.clear();
    }

    /// Write deformed positions for one registered mesh.
    ///
    /// `direction_deg` is the azimuth the wind blows toward; `t` is the
    /// scene clock in seconds. Positions are always recomputed from the
    /// registered base, so the result depends only on this call's inputs.
    pub fn apply(
        &self,
        mesh_id: u64,
        mesh: &mut MeshData,
        speed: f32,
        direction_deg: f32,
        t: f32,
        enabled: bool,
    ) {
        let Some(reg) = self.registrations.get(&mesh_id) else {
            return;
        };
        if mesh.vertices.len() != reg.base_positions.len() {
            log::warn!("wind: mesh {mesh_id} vertex count changed since registration, skipping");
            return;
        }

        if !enabled || speed <= 0.0 {
            for (v, base) in mesh.vertices.iter_mut().zip(&reg.base_positions) {
                v.position = *base;
            }
            return;
        }

        let azimuth = direction_deg.to_radians();
        let (dir_x, dir_z) = (azimuth.cos(), azimuth.sin());
        let lean = speed * LEAN_PER_SPEED;
        let gust_amp = speed * GUST_PER_SPEED * (1.0 - reg.stiffness);

        for ((v, base), (&weight, &phase)) in mesh
            .vertices
            .iter_mut()
            .zip(&reg.base_positions)
            .zip(reg.weights.iter().zip(&reg.phases))
        {
            let gust = (t * GUST_FREQ_PRIMARY + phase).sin() * 0.7
                + (t * GUST_FREQ_SECONDARY + phase * 1.7).sin() * 0.3;
            let along = (lean + gust * gust_amp) * weight;
            v.position = [
                base[0] + along * dir_x,
                base[1],
                base[2] + along * dir_z,
            ];
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
