//! Cloud sprite field with procedural wobble.

use glam::Vec3;
use noise::{NoiseFn, Perlin};

use crate::trees::rng::TreeRng;

const WOBBLE_AMPLITUDE: f32 = 14.0;
const WOBBLE_RATE: f64 = 0.02;

#[derive(Clone, Copy, Debug)]
pub struct CloudSprite {
    pub base_position: Vec3,
    pub scale: f32,
}

pub struct CloudField {
    sprites: Vec<CloudSprite>,
    perlin: Perlin,
}

impl CloudField {
    /// Scatter `capacity` cloud sprites in a ring above the scene.
    pub fn new(capacity: usize, altitude: f32, radius: f32, seed: u32) -> Self {
        let mut rng = TreeRng::new(seed);
        let sprites = (0..capacity)
            .map(|_| {
                let angle = rng.range(0.0, std::f32::consts::TAU);
                let r = rng.range(radius * 0.3, radius);
                CloudSprite {
                    base_position: Vec3::new(
                        angle.cos() * r,
                        altitude + rng.range(-20.0, 40.0),
                        angle.sin() * r,
                    ),
                    scale: rng.range(0.7, 1.6),
                }
            })
            .collect();
        Self {
            sprites,
            perlin: Perlin::new(seed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.sprites.len()
    }

    /// Current position of one sprite: base plus slow noise wobble.
    pub fn position(&self, index: usize, t: f32) -> Vec3 {
        let sprite = &self.sprites[index];
        let b = sprite.base_position;
        let sample = |axis_offset: f64| {
            self.perlin.get([
                b.x as f64 * 0.01 + t as f64 * WOBBLE_RATE,
                b.z as f64 * 0.01 + axis_offset,
            ]) as f32
        };
        b + Vec3::new(sample(0.0), 0.0, sample(37.0)) * WOBBLE_AMPLITUDE
    }

    /// The leading `count` sprites.
    pub fn draw_range(&self, count: usize) -> &[CloudSprite] {
        &self.sprites[..count.min(self.sprites.len())]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
