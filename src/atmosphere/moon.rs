//! Low-precision lunar ephemeris and procedural phase disk.
//!
//! Truncated Meeus series: good to a fraction of a degree, which is far
//! more than a scene light source needs.

use chrono::{DateTime, Utc};

use super::sun::{horizontal_from_equatorial, julian_centuries, julian_day, HorizontalPosition};

/// Lunar altitude/azimuth for an observer at `(lat, lon)` degrees.
pub fn lunar_position(time: DateTime<Utc>, lat: f64, lon: f64) -> HorizontalPosition {
    let t = julian_centuries(time);

    // Mean elements, degrees
    let mean_longitude = 218.316 + 481267.8813 * t;
    let mean_anomaly = 134.963 + 477198.8676 * t;
    let latitude_argument = 93.272 + 483202.0175 * t;

    let ecliptic_longitude = mean_longitude + 6.289 * mean_anomaly.to_radians().sin();
    let ecliptic_latitude = 5.128 * latitude_argument.to_radians().sin();

    // Ecliptic → equatorial with the mean obliquity
    let obliquity = (23.4393 - 0.0130 * t).to_radians();
    let lam = ecliptic_longitude.to_radians();
    let beta = ecliptic_latitude.to_radians();
    let right_ascension = (lam.sin() * obliquity.cos() - beta.tan() * obliquity.sin())
        .atan2(lam.cos())
        .to_degrees();
    let declination = (beta.sin() * obliquity.cos() + beta.cos() * obliquity.sin() * lam.sin())
        .asin()
        .to_degrees();

    // Local hour angle from sidereal time
    let d = julian_day(time) - 2451545.0;
    let sidereal = (280.46061837 + 360.98564736629 * d + lon).rem_euclid(360.0);
    let hour_angle = (sidereal - right_ascension).rem_euclid(360.0);

    horizontal_from_equatorial(declination, hour_angle, lat)
}

/// Illuminated fraction of the lunar disk, 0 (new) to 1 (full), plus
/// whether the moon is waxing.
pub fn phase_fraction(time: DateTime<Utc>) -> (f64, bool) {
    let t = julian_centuries(time);
    let elongation = 297.850 + 445267.1115 * t;
    let sun_anomaly = 357.529 + 35999.0503 * t;
    let moon_anomaly = 134.963 + 477198.8676 * t;

    // Phase angle, Meeus truncated
    let phase_angle = 180.0 - elongation.rem_euclid(360.0)
        - 6.289 * moon_anomaly.to_radians().sin()
        + 2.100 * sun_anomaly.to_radians().sin();
    let fraction = (1.0 + phase_angle.to_radians().cos()) / 2.0;
    let waxing = elongation.rem_euclid(360.0) < 180.0;
    (fraction.clamp(0.0, 1.0), waxing)
}

/// Grayscale phase disk raster, `size x size`, row-major, 255 = lit.
///
/// The terminator follows a cosine curve across the disk: a two-tone split
/// that reads as the current phase without any image assets.
pub fn phase_disk(phase: f32, waxing: bool, size: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; size * size];
    if size == 0 {
        return pixels;
    }
    let half = size as f32 / 2.0;
    let terminator = (std::f32::consts::PI * phase.clamp(0.0, 1.0)).cos();
    for row in 0..size {
        let y = (row as f32 + 0.5 - half) / half;
        let width = (1.0 - y * y).max(0.0).sqrt();
        for col in 0..size {
            let x = (col as f32 + 0.5 - half) / half;
            if x * x + y * y > 1.0 {
                continue; // outside the disk
            }
            // Waxing lights the right limb first
            let lit = if waxing {
                x >= width * terminator
            } else {
                x <= -width * terminator
            };
            pixels[row * size + col] = if lit { 255 } else { 40 };
        }
    }
    pixels
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_known_full_moon_fraction() {
        // 2024-04-23 was a full moon
        let time = Utc.with_ymd_and_hms(2024, 4, 23, 23, 0, 0).unwrap();
        let (fraction, _) = phase_fraction(time);
        assert!(fraction > 0.95, "fraction = {fraction}");
    }

    #[test]
    fn test_known_new_moon_fraction() {
        // 2024-04-08 total solar eclipse, necessarily a new moon
        let time = Utc.with_ymd_and_hms(2024, 4, 8, 23, 0, 0).unwrap();
        let (fraction, waxing) = phase_fraction(time);
        assert!(fraction < 0.05, "fraction = {fraction}");
        assert!(waxing, "just past new moon is waxing");
    }

    #[test]
    fn test_phase_disk_extremes() {
        let size = 32;
        let full = phase_disk(1.0, true, size);
        let new = phase_disk(0.0, true, size);
        let full_lit = full.iter().filter(|&&p| p == 255).count();
        let new_lit = new.iter().filter(|&&p| p == 255).count();
        let disk_pixels = full.iter().filter(|&&p| p > 0).count();
        assert_eq!(full_lit, disk_pixels, "full moon disk entirely lit");
        assert_eq!(new_lit, 0, "new moon disk entirely dark");
    }

    #[test]
    fn test_half_phase_splits_disk() {
        let size = 64;
        let half = phase_disk(0.5, true, size);
        let lit = half.iter().filter(|&&p| p == 255).count() as f32;
        let disk = half.iter().filter(|&&p| p > 0).count() as f32;
        let ratio = lit / disk;
        assert!((ratio - 0.5).abs() < 0.05, "lit ratio = {ratio}");
        // Waxing half lights the right side
        let mid = size / 2;
        assert_eq!(half[mid * size + size - size / 4], 255);
        assert_eq!(half[mid * size + size / 4], 40);
    }

    #[test]
    fn test_waning_mirrors_waxing() {
        let size = 32;
        let waxing = phase_disk(0.3, true, size);
        let waning = phase_disk(0.3, false, size);
        for row in 0..size {
            for col in 0..size {
                assert_eq!(
                    waxing[row * size + col],
                    waning[row * size + size - 1 - col],
                    "row {row} col {col}"
                );
            }
        }
    }

    #[test]
    fn test_lunar_position_is_finite_and_bounded() {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 3, 30, 0).unwrap();
        let pos = lunar_position(time, 40.0, -74.0);
        assert!(pos.altitude_deg.is_finite());
        assert!((-90.0..=90.0).contains(&pos.altitude_deg));
        assert!((0.0..360.0).contains(&pos.azimuth_deg));
    }
}
