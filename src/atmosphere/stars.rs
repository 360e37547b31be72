//! Seeded star field with twilight fade, slow drift, and twinkle.

use glam::{Quat, Vec3};

use crate::trees::rng::TreeRng;

/// Sun altitude where stars start to appear.
const FADE_START_DEG: f32 = -2.0;
/// Sun altitude where stars are fully visible.
const FADE_END_DEG: f32 = -12.0;
/// Fraction of real sidereal rate the field rotates at.
const ROTATION_FRACTION: f32 = 0.25;
/// Degrees per second of the full sidereal rate.
const SIDEREAL_DEG_PER_SEC: f32 = 360.0 / 86164.0;
/// Roughly this share of stars twinkle.
const TWINKLE_SHARE: f32 = 0.3;
const TWINKLE_DEPTH: f32 = 0.5;

#[derive(Clone, Copy, Debug)]
pub struct Star {
    /// Unit direction on the upper hemisphere.
    pub direction: Vec3,
    pub brightness: f32,
    /// Twinkle phase; `None` for steady stars.
    pub twinkle_phase: Option<f32>,
}

pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    pub fn new(count: usize, seed: u32) -> Self {
        let mut rng = TreeRng::new(seed);
        let stars = (0..count)
            .map(|_| {
                // Uniform over the upper hemisphere
                let azimuth = rng.range(0.0, std::f32::consts::TAU);
                let y = rng.next_float();
                let horizontal = (1.0 - y * y).max(0.0).sqrt();
                let twinkle = rng.next_float() < TWINKLE_SHARE;
                Star {
                    direction: Vec3::new(
                        azimuth.cos() * horizontal,
                        y,
                        azimuth.sin() * horizontal,
                    ),
                    brightness: rng.range(0.3, 1.0),
                    twinkle_phase: twinkle.then(|| rng.range(0.0, std::f32::consts::TAU)),
                }
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Field-wide visibility for a sun altitude: 0 in daylight, ramping to
    /// 1 once the sun is deep enough below the horizon.
    pub fn visibility(sun_altitude_deg: f32) -> f32 {
        ((FADE_START_DEG - sun_altitude_deg) / (FADE_START_DEG - FADE_END_DEG)).clamp(0.0, 1.0)
    }

    /// Rotation of the whole field about the vertical axis at time `t`.
    pub fn rotation(t: f32) -> Quat {
        let angle = (t * SIDEREAL_DEG_PER_SEC * ROTATION_FRACTION).to_radians();
        Quat::from_rotation_y(angle)
    }

    /// Current direction of one star.
    pub fn direction(&self, index: usize, t: f32) -> Vec3 {
        Self::rotation(t) * self.stars[index].direction
    }

    /// Current opacity of one star, combining visibility and twinkle.
    pub fn opacity(&self, index: usize, t: f32, visibility: f32) -> f32 {
        let star = &self.stars[index];
        let twinkle = match star.twinkle_phase {
            Some(phase) => 1.0 - TWINKLE_DEPTH * 0.5 * (1.0 + (t * 3.1 + phase).sin()),
            None => 1.0,
        };
        (star.brightness * twinkle * visibility).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_on_upper_hemisphere() {
        let field = StarField::new(200, 5);
        for star in field.stars() {
            assert!(star.direction.y >= 0.0);
            assert!((star.direction.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_visibility_ramp() {
        assert_eq!(StarField::visibility(30.0), 0.0, "daylight hides stars");
        assert_eq!(StarField::visibility(-20.0), 1.0, "deep night shows all");
        let mid = StarField::visibility(-7.0);
        assert!(mid > 0.0 && mid < 1.0, "twilight is partial: {mid}");
    }

    #[test]
    fn test_rotation_preserves_elevation() {
        let field = StarField::new(50, 5);
        for i in 0..50 {
            let d0 = field.direction(i, 0.0);
            let d1 = field.direction(i, 3600.0);
            assert!((d0.y - d1.y).abs() < 1e-5, "rotation is about vertical");
            assert!((d1.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rotation_advances_slowly() {
        let r = StarField::rotation(3600.0);
        let moved = (r * Vec3::X).angle_between(Vec3::X).to_degrees();
        // Quarter sidereal rate over one hour
        assert!((moved - 3600.0 * SIDEREAL_DEG_PER_SEC * 0.25).abs() < 0.01);
    }

    #[test]
    fn test_some_stars_twinkle() {
        let field = StarField::new(300, 5);
        let twinkling = field.stars().iter().filter(|s| s.twinkle_phase.is_some()).count();
        assert!(twinkling > 40 && twinkling < 160, "twinkling = {twinkling}");
        // Twinkling star's opacity varies over time
        let idx = field
            .stars()
            .iter()
            .position(|s| s.twinkle_phase.is_some())
            .unwrap();
        let samples: Vec<f32> = (0..20)
            .map(|i| field.opacity(idx, i as f32 * 0.37, 1.0))
            .collect();
        let min = samples.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = samples.iter().cloned().fold(0.0_f32, f32::max);
        assert!(max - min > 0.05, "twinkle should modulate opacity");
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = StarField::new(64, 9);
        let b = StarField::new(64, 9);
        for (x, y) in a.stars().iter().zip(b.stars()) {
            assert_eq!(x.direction, y.direction);
            assert_eq!(x.brightness, y.brightness);
        }
    }
}
