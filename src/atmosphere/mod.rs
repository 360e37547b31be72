//! Celestial lighting: sun, moon, and stars driving the scene's
//! directional lights.

pub mod moon;
pub mod stars;
pub mod sun;

use chrono::{DateTime, Utc};
use glam::Vec3;

use stars::StarField;
use sun::HorizontalPosition;

/// Distance light sources sit from the scene origin.
pub const LIGHT_DISTANCE: f32 = 2000.0;
/// Altitude band below the horizon over which intensity fades to zero.
pub const HORIZON_FADE_DEG: f32 = 6.0;
/// Exponential smoothing rate toward target intensity, per second.
const SMOOTH_RATE: f32 = 1.5;

const STAR_COUNT: usize = 400;

/// One directional light driven by a celestial body.
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyLight {
    pub horizontal: HorizontalPosition,
    /// Unit direction from the scene toward the body.
    pub direction: Vec3,
    /// Light position at [`LIGHT_DISTANCE`].
    pub position: Vec3,
    pub target_intensity: f32,
    /// Smoothed intensity actually applied to the light.
    pub intensity: f32,
}

pub struct CelestialSystem {
    latitude: f64,
    longitude: f64,
    /// Degrees added to every azimuth so the building can face any way.
    building_rotation_deg: f32,
    pub sun: BodyLight,
    pub moon: BodyLight,
    pub moon_phase: f64,
    pub moon_waxing: bool,
    pub stars: StarField,
    pub star_visibility: f32,
}

impl CelestialSystem {
    pub fn new(latitude: f64, longitude: f64, building_rotation_deg: f32, star_seed: u32) -> Self {
        Self {
            latitude,
            longitude,
            building_rotation_deg,
            sun: BodyLight::default(),
            moon: BodyLight::default(),
            moon_phase: 0.0,
            moon_waxing: true,
            stars: StarField::new(STAR_COUNT, star_seed),
            star_visibility: 0.0,
        }
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64) {
        self.latitude = latitude;
        self.longitude = longitude;
    }

    pub fn set_building_rotation(&mut self, degrees: f32) {
        self.building_rotation_deg = degrees;
    }

    /// Regenerate the star field from a new seed.
    pub fn reseed_stars(&mut self, seed: u32) {
        self.stars = StarField::new(STAR_COUNT, seed);
    }

    /// Scene-local unit direction for an altitude/azimuth pair. The
    /// building rotation is applied here, once, so nothing downstream
    /// needs to know about it. North is -Z, east is +X.
    fn scene_direction(&self, pos: HorizontalPosition) -> Vec3 {
        let altitude = (pos.altitude_deg as f32).to_radians();
        let azimuth = (pos.azimuth_deg as f32 + self.building_rotation_deg).to_radians();
        Vec3::new(
            altitude.cos() * azimuth.sin(),
            altitude.sin(),
            -altitude.cos() * azimuth.cos(),
        )
    }

    /// Target intensity for a body altitude: full above the horizon,
    /// fading linearly to zero over the band below it.
    fn altitude_intensity(altitude_deg: f64) -> f32 {
        ((altitude_deg as f32 + HORIZON_FADE_DEG) / HORIZON_FADE_DEG).clamp(0.0, 1.0)
    }

    /// Recompute body positions and ease intensities toward their targets.
    /// `cloud_dimming` comes from the weather system; `dt` is in seconds.
    pub fn update(&mut self, date: DateTime<Utc>, dt: f32, cloud_dimming: f32) {
        let sun_pos = sun::solar_position(date, self.latitude, self.longitude);
        self.sun.horizontal = sun_pos;
        self.sun.direction = self.scene_direction(sun_pos);
        self.sun.position = self.sun.direction * LIGHT_DISTANCE;
        self.sun.target_intensity =
            Self::altitude_intensity(sun_pos.altitude_deg) * cloud_dimming;

        let moon_pos = moon::lunar_position(date, self.latitude, self.longitude);
        let (phase, waxing) = moon::phase_fraction(date);
        self.moon_phase = phase;
        self.moon_waxing = waxing;
        self.moon.horizontal = moon_pos;
        self.moon.direction = self.scene_direction(moon_pos);
        self.moon.position = self.moon.direction * LIGHT_DISTANCE;
        self.moon.target_intensity = Self::altitude_intensity(moon_pos.altitude_deg)
            * cloud_dimming
            * phase as f32;

        // Ease, never snap: crossing the horizon must not pop.
        let blend = (dt * SMOOTH_RATE).clamp(0.0, 1.0);
        self.sun.intensity += (self.sun.target_intensity - self.sun.intensity) * blend;
        self.moon.intensity += (self.moon.target_intensity - self.moon.intensity) * blend;

        self.star_visibility = StarField::visibility(sun_pos.altitude_deg as f32);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 7, 0).unwrap()
    }

    fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_noon_sun_full_target_at_origin() {
        let mut system = CelestialSystem::new(0.0, 0.0, 0.0, 1);
        system.update(noon(), 0.1, 1.0);
        assert!(system.sun.horizontal.altitude_deg > 87.0);
        assert_eq!(system.sun.target_intensity, 1.0);
        assert!(system.sun.direction.y > 0.99, "sun nearly overhead");
        assert!((system.sun.position.length() - LIGHT_DISTANCE).abs() < 0.5);
    }

    #[test]
    fn test_sun_and_moon_never_both_full_when_one_is_set() {
        let mut system = CelestialSystem::new(0.0, 0.0, 0.0, 1);
        for hour in 0..24 {
            let date = Utc.with_ymd_and_hms(2024, 3, 20, hour, 0, 0).unwrap();
            system.update(date, 0.1, 1.0);
            let sun_up = system.sun.horizontal.altitude_deg > 0.0;
            let moon_up = system.moon.horizontal.altitude_deg > 0.0;
            if !sun_up {
                assert!(
                    system.sun.target_intensity < 1.0,
                    "sun below horizon cannot be at full target"
                );
            }
            if !moon_up {
                assert!(system.moon.target_intensity < 1.0);
            }
        }
    }

    #[test]
    fn test_intensity_eases_not_snaps() {
        let mut system = CelestialSystem::new(0.0, 0.0, 0.0, 1);
        // Start at night: intensity settles near zero
        for _ in 0..100 {
            system.update(midnight(), 0.1, 1.0);
        }
        let night = system.sun.intensity;
        assert!(night < 0.05);
        // One daytime frame moves partway, not all the way
        system.update(noon(), 0.1, 1.0);
        assert!(system.sun.intensity > night);
        assert!(
            system.sun.intensity < 0.5,
            "one frame must not snap to target, got {}",
            system.sun.intensity
        );
    }

    #[test]
    fn test_cloud_dimming_scales_target() {
        let mut system = CelestialSystem::new(0.0, 0.0, 0.0, 1);
        system.update(noon(), 0.1, 0.4);
        assert!((system.sun.target_intensity - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_building_rotation_changes_azimuth_only() {
        let date = Utc.with_ymd_and_hms(2024, 6, 21, 8, 0, 0).unwrap();
        let mut plain = CelestialSystem::new(45.0, 0.0, 0.0, 1);
        let mut rotated = CelestialSystem::new(45.0, 0.0, 90.0, 1);
        plain.update(date, 0.1, 1.0);
        rotated.update(date, 0.1, 1.0);
        assert!((plain.sun.direction.y - rotated.sun.direction.y).abs() < 1e-5);
        assert!(
            plain.sun.direction.distance(rotated.sun.direction) > 0.1,
            "rotation must move the horizontal component"
        );
    }

    #[test]
    fn test_stars_visible_at_night_only() {
        let mut system = CelestialSystem::new(0.0, 0.0, 0.0, 1);
        system.update(noon(), 0.1, 1.0);
        assert_eq!(system.star_visibility, 0.0);
        system.update(midnight(), 0.1, 1.0);
        assert_eq!(system.star_visibility, 1.0);
    }
}
