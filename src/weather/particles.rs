//! Fixed-capacity precipitation particle pools.
//!
//! Every particle is allocated up front; varying intensity only changes
//! how many of the leading particles are drawn, so mode transitions never
//! allocate.

use glam::{Vec2, Vec3};

use crate::trees::rng::TreeRng;

/// Axis-aligned spawn/wrap volume centered on the scene origin.
#[derive(Clone, Copy, Debug)]
pub struct ParticleVolume {
    /// Half extent in world X and Z.
    pub half_extent: f32,
    /// Top of the volume; particles respawn near here.
    pub height: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub fall_speed: f32,
    pub drift: Vec2,
}

pub struct ParticlePool {
    particles: Vec<Particle>,
    volume: ParticleVolume,
    speed_range: (f32, f32),
    drift_max: f32,
    rng: TreeRng,
}

impl ParticlePool {
    pub fn new(
        capacity: usize,
        volume: ParticleVolume,
        speed_range: (f32, f32),
        drift_max: f32,
        seed: u32,
    ) -> Self {
        let mut rng = TreeRng::new(seed);
        let particles = (0..capacity)
            .map(|_| Self::spawn(&mut rng, volume, speed_range, drift_max, true))
            .collect();
        Self {
            particles,
            volume,
            speed_range,
            drift_max,
            rng,
        }
    }

    fn spawn(
        rng: &mut TreeRng,
        volume: ParticleVolume,
        speed_range: (f32, f32),
        drift_max: f32,
        anywhere: bool,
    ) -> Particle {
        let y = if anywhere {
            rng.range(0.0, volume.height)
        } else {
            // Respawn near the top so wrapped particles re-enter naturally
            rng.range(volume.height * 0.85, volume.height)
        };
        Particle {
            position: Vec3::new(
                rng.range(-volume.half_extent, volume.half_extent),
                y,
                rng.range(-volume.half_extent, volume.half_extent),
            ),
            fall_speed: rng.range(speed_range.0, speed_range.1),
            drift: Vec2::new(
                rng.range(-drift_max, drift_max),
                rng.range(-drift_max, drift_max),
            ),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Advance all particles by `speed × dt`, wrapping any that exit the
    /// volume to a fresh random position.
    pub fn advance(&mut self, dt: f32) {
        let volume = self.volume;
        let speed_range = self.speed_range;
        let drift_max = self.drift_max;
        for p in &mut self.particles {
            p.position.y -= p.fall_speed * dt;
            p.position.x += p.drift.x * dt;
            p.position.z += p.drift.y * dt;
            let out = p.position.y < 0.0
                || p.position.x.abs() > volume.half_extent
                || p.position.z.abs() > volume.half_extent;
            if out {
                *p = Self::spawn(&mut self.rng, volume, speed_range, drift_max, false);
            }
        }
    }

    /// The leading `count` particles, the only ones a renderer draws.
    pub fn draw_range(&self, count: usize) -> &[Particle] {
        &self.particles[..count.min(self.particles.len())]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ParticlePool {
        ParticlePool::new(
            200,
            ParticleVolume {
                half_extent: 100.0,
                height: 150.0,
            },
            (20.0, 40.0),
            3.0,
            7,
        )
    }

    #[test]
    fn test_capacity_fixed_across_advances() {
        let mut p = pool();
        for _ in 0..500 {
            p.advance(0.1);
        }
        assert_eq!(p.capacity(), 200);
    }

    #[test]
    fn test_particles_stay_in_volume() {
        let mut p = pool();
        for _ in 0..500 {
            p.advance(0.1);
        }
        for particle in p.draw_range(200) {
            assert!(particle.position.y >= 0.0 && particle.position.y <= 150.0);
            assert!(particle.position.x.abs() <= 100.0 + 0.5);
            assert!(particle.position.z.abs() <= 100.0 + 0.5);
        }
    }

    #[test]
    fn test_particles_fall() {
        let mut p = pool();
        let before: Vec<f32> = p.draw_range(10).iter().map(|q| q.position.y).collect();
        p.advance(0.05);
        for (particle, y0) in p.draw_range(10).iter().zip(before) {
            // 0.05s at <=40 speed: either fell slightly or wrapped to top
            assert!(particle.position.y < y0 || particle.position.y > 150.0 * 0.85);
        }
    }

    #[test]
    fn test_draw_range_clamps() {
        let p = pool();
        assert_eq!(p.draw_range(50).len(), 50);
        assert_eq!(p.draw_range(10_000).len(), 200);
    }
}
