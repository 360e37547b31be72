//! Procedural tree generation.
//!
//! Trees are generated deterministically from `(kind, height, diameter,
//! seed)`: the same inputs always yield the same vertex set. Three
//! archetypes exist: conical (evergreen, stacked cone foliage), and
//! round/oval (deciduous, branch hierarchy plus a canopy envelope).

pub mod canopy;
pub mod rng;
pub mod season;
pub mod stick;

use glam::{Quat, Vec2, Vec3};

use crate::math::mesh::MeshData;
use crate::math::plan_to_world;
use crate::plan::{Tree, TreeKind};

use canopy::CanopyParams;
use rng::TreeRng;
use season::foliage_state;
use stick::{stick_mesh_oriented, StickParams};

const BARK_COLOR: [f32; 3] = [0.35, 0.27, 0.20];
const CONIFER_COLOR: [f32; 3] = [0.13, 0.35, 0.16];

/// Tunable generation constants. The defaults are calibrated by eye, not
/// contract; callers may override per scene.
#[derive(Clone, Copy, Debug)]
pub struct TreeParams {
    /// First-order branches per unit of tree height (round/oval).
    pub branch_density: f32,
    /// Recursive fork depth below first-order branches.
    pub fork_depth: u32,
    /// Maximum stacked cone segments (conical).
    pub cone_segments: usize,
    /// Each cone base must reach at least this fraction of the cone
    /// below's silhouette radius at that height.
    pub min_cone_overlap: f32,
    pub canopy: CanopyParams,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            branch_density: 0.08,
            fork_depth: 2,
            cone_segments: 10,
            min_cone_overlap: 0.55,
            canopy: CanopyParams::default(),
        }
    }
}

/// Which structural part a mesh represents, for wind registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartRole {
    Trunk,
    Branch,
    Canopy,
}

/// Per-mesh wind registration hint. Trunks are stiffest, canopies loosest.
#[derive(Clone, Copy, Debug)]
pub struct PartHint {
    pub role: PartRole,
    pub height: f32,
    pub stiffness: f32,
    pub max_sway_ratio: f32,
}

impl PartHint {
    fn for_role(role: PartRole, height: f32) -> Self {
        let (stiffness, max_sway_ratio) = match role {
            PartRole::Trunk => (0.9, 0.015),
            PartRole::Branch => (0.6, 0.04),
            PartRole::Canopy => (0.3, 0.07),
        };
        Self {
            role,
            height,
            stiffness,
            max_sway_ratio,
        }
    }
}

/// A fully generated tree, positioned in world space.
#[derive(Clone, Debug, Default)]
pub struct GeneratedTree {
    pub trunk: MeshData,
    pub branches: MeshData,
    pub canopy: Option<MeshData>,
    /// One hint per non-empty mesh, in trunk/branches/canopy order.
    pub parts: Vec<PartHint>,
}

pub struct TreeGenerator {
    pub params: TreeParams,
}

impl TreeGenerator {
    pub fn new(params: TreeParams) -> Self {
        Self { params }
    }

    /// Generate the mesh set for one placed tree at its group's elevation.
    pub fn generate(&self, tree: &Tree, elevation: f32, month: u32, day: u32) -> GeneratedTree {
        if tree.height <= 0.0 || tree.diameter <= 0.0 {
            return GeneratedTree::default();
        }
        let mut rng = TreeRng::new(tree.seed);
        let mut out = match tree.kind {
            TreeKind::Conical => self.generate_conical(tree, &mut rng),
            TreeKind::Round | TreeKind::Oval => self.generate_branching(tree, &mut rng, month, day),
        };

        let origin = plan_to_world(Vec2::new(tree.x, tree.y), elevation);
        out.trunk.translate(origin);
        out.branches.translate(origin);
        if let Some(c) = &mut out.canopy {
            c.translate(origin);
        }

        if !out.trunk.is_empty() {
            out.parts.push(PartHint::for_role(PartRole::Trunk, tree.height));
        }
        if !out.branches.is_empty() {
            out.parts.push(PartHint::for_role(PartRole::Branch, tree.height));
        }
        if out.canopy.as_ref().is_some_and(|c| !c.is_empty()) {
            out.parts.push(PartHint::for_role(PartRole::Canopy, tree.height));
        }
        out
    }

    fn trunk_params(&self, tree: &Tree, length: f32) -> StickParams {
        StickParams {
            length,
            base_radius: (tree.diameter * 0.035).clamp(1.0, 6.0),
            tip_radius: (tree.diameter * 0.012).clamp(0.3, 2.0),
            bend: 0.02,
            taper_start: 0.25,
            segments: 6,
            sides: 8,
        }
    }

    fn generate_conical(&self, tree: &Tree, rng: &mut TreeRng) -> GeneratedTree {
        let trunk = stick_mesh_oriented(
            &self.trunk_params(tree, tree.height * 0.6),
            rng,
            Vec3::ZERO,
            Vec3::Y,
            BARK_COLOR,
        );

        // Stacked cones from just above the base to the tip, each bounded
        // by the height taper and by minimum overlap with the cone below.
        let mut foliage = MeshData::new();
        let band_start = tree.height * 0.15;
        let band = tree.height - band_start;
        let n = self.params.cone_segments.max(1);
        let step = band / n as f32;
        let max_radius = tree.diameter * 0.5;
        let mut prev_radius = max_radius;
        let mut prev_base = band_start;
        let mut prev_len = step;
        for i in 0..n {
            let base_y = band_start + i as f32 * step;
            let taper_bound = max_radius * (1.0 - i as f32 / n as f32 * 0.85);
            let mut radius = taper_bound * rng.range(0.85, 1.0);
            if i > 0 {
                let below_at = prev_radius * (1.0 - (base_y - prev_base) / prev_len).max(0.0);
                radius = radius.max(below_at * self.params.min_cone_overlap);
            }
            let len = step * rng.range(1.5, 1.8);
            let cone = StickParams {
                length: len,
                base_radius: radius,
                tip_radius: 0.05,
                bend: 0.0,
                taper_start: 0.0,
                segments: 1,
                sides: 10,
            };
            foliage.merge(&stick_mesh_oriented(
                &cone,
                rng,
                Vec3::new(0.0, base_y, 0.0),
                Vec3::Y,
                CONIFER_COLOR,
            ));
            prev_radius = radius;
            prev_base = base_y;
            prev_len = len;
        }

        GeneratedTree {
            trunk,
            branches: MeshData::new(),
            canopy: Some(foliage),
            parts: Vec::new(),
        }
    }

    fn generate_branching(
        &self,
        tree: &Tree,
        rng: &mut TreeRng,
        month: u32,
        day: u32,
    ) -> GeneratedTree {
        let trunk_height = tree.height * 0.65;
        let trunk_params = self.trunk_params(tree, trunk_height);
        let trunk = stick_mesh_oriented(&trunk_params, rng, Vec3::ZERO, Vec3::Y, BARK_COLOR);

        // Stratified then shuffled attachment fractions keep branches
        // spread over the crown without a visible regular ladder.
        let count = ((tree.height * self.params.branch_density).round() as usize).max(3);
        let mut fractions: Vec<f32> = (0..count)
            .map(|i| {
                let lo = 0.45 + 0.5 * i as f32 / count as f32;
                lo + rng.next_float() * 0.5 / count as f32
            })
            .collect();
        rng.shuffle(&mut fractions);

        let mut branches = MeshData::new();
        let mut azimuths: Vec<f32> = Vec::with_capacity(count);
        for f in fractions {
            let azimuth = pick_azimuth(rng, &azimuths);
            azimuths.push(azimuth);
            let tilt = rng.range(0.45, 1.0); // radians above horizontal
            let dir = Vec3::new(
                azimuth.cos() * tilt.cos(),
                tilt.sin(),
                azimuth.sin() * tilt.cos(),
            );
            // Branches reach roughly to the canopy envelope at their height
            let band_t = ((f - 0.7) / 0.3).clamp(-1.0, 1.0);
            let envelope = (1.0 - band_t * band_t).max(0.05).sqrt();
            let length = tree.diameter * 0.5 * envelope * rng.range(0.7, 1.0);
            let origin = Vec3::new(0.0, (f * trunk_height / 0.95).min(trunk_height), 0.0);
            grow_branch(
                &mut branches,
                rng,
                origin,
                dir,
                length,
                trunk_params.tip_radius.max(0.8),
                self.params.fork_depth,
            );
        }

        let foliage = foliage_state(month, day);
        let canopy = if foliage.visible {
            Some(canopy::build(
                tree.kind,
                tree.height,
                tree.diameter,
                rng,
                &self.params.canopy,
                foliage.color,
            ))
        } else {
            None
        };

        GeneratedTree {
            trunk,
            branches,
            canopy,
            parts: Vec::new(),
        }
    }
}

/// Weighted-random azimuth biased toward the widest gap among the azimuths
/// already placed, so branches avoid clustering on one side.
fn pick_azimuth(rng: &mut TreeRng, placed: &[f32]) -> f32 {
    use std::f32::consts::TAU;
    if placed.is_empty() {
        return rng.range(0.0, TAU);
    }
    let mut sorted = placed.to_vec();
    sorted.sort_by(f32::total_cmp);

    // Gap i runs from sorted[i] to the next azimuth (wrapping).
    let n = sorted.len();
    let gaps: Vec<(f32, f32)> = (0..n)
        .map(|i| {
            let start = sorted[i];
            let end = if i + 1 < n { sorted[i + 1] } else { sorted[0] + TAU };
            (start, end - start)
        })
        .collect();

    let total: f32 = gaps.iter().map(|&(_, w)| w * w).sum();
    let mut pick = rng.next_float() * total;
    for &(start, width) in &gaps {
        pick -= width * width;
        if pick <= 0.0 {
            return (start + width * rng.range(0.3, 0.7)) % TAU;
        }
    }
    let (start, width) = gaps[n - 1];
    (start + width * 0.5) % TAU
}

/// Recursively grow one branch and its forks.
fn grow_branch(
    out: &mut MeshData,
    rng: &mut TreeRng,
    origin: Vec3,
    dir: Vec3,
    length: f32,
    radius: f32,
    depth: u32,
) {
    if length < 1.0 {
        return;
    }
    let params = StickParams {
        length,
        base_radius: radius,
        tip_radius: (radius * 0.35).max(0.2),
        bend: 0.05,
        taper_start: 0.0,
        segments: 3,
        sides: 6,
    };
    out.merge(&stick_mesh_oriented(&params, rng, origin, dir, BARK_COLOR));

    if depth == 0 {
        return;
    }
    // Two forks near the outer part of the parent, on alternating sides.
    let axis = dir
        .cross(Vec3::Y)
        .try_normalize()
        .unwrap_or(Vec3::X);
    for side in [1.0_f32, -1.0] {
        let at = rng.range(0.55, 0.9);
        let angle = rng.range(0.45, 0.7) * side;
        let child_dir = Quat::from_axis_angle(axis, angle) * dir;
        let child_origin = origin + dir * (length * at);
        let child_length = length * rng.range(0.5, 0.65);
        grow_branch(
            out,
            rng,
            child_origin,
            child_dir,
            child_length,
            radius * 0.6,
            depth - 1,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
