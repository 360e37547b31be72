//! Solar position from date and observer location.
//!
//! NOAA's solar calculator formulation: Julian centuries, geometric mean
//! longitude and anomaly, equation of center, declination, and equation of
//! time, reduced to altitude/azimuth for the observer.

use chrono::{DateTime, Timelike, Utc};

/// Horizontal coordinates of a celestial body, degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HorizontalPosition {
    /// Angle above the horizon, negative below.
    pub altitude_deg: f64,
    /// Clockwise from true north.
    pub azimuth_deg: f64,
}

/// Days since the Julian epoch, including the time of day.
pub fn julian_day(time: DateTime<Utc>) -> f64 {
    time.timestamp() as f64 / 86400.0 + 2440587.5
}

/// Julian centuries since J2000.0.
pub fn julian_centuries(time: DateTime<Utc>) -> f64 {
    (julian_day(time) - 2451545.0) / 36525.0
}

/// Sun declination (degrees) and equation of time (minutes) at `t`
/// Julian centuries.
fn declination_and_eot(t: f64) -> (f64, f64) {
    let l0 = (280.46646 + t * (36000.76983 + t * 0.0003032)).rem_euclid(360.0);
    let m = 357.52911 + t * (35999.05029 - 0.0001537 * t);
    let e = 0.016708634 - t * (0.000042037 + 0.0000001267 * t);

    let mr = m.to_radians();
    let center = mr.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * mr).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * mr).sin() * 0.000289;
    let true_long = l0 + center;
    let omega = 125.04 - 1934.136 * t;
    let apparent_long = true_long - 0.00569 - 0.00478 * omega.to_radians().sin();

    let mean_obliquity = 23.0
        + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    let obliquity = mean_obliquity + 0.00256 * omega.to_radians().cos();

    let declination = (obliquity.to_radians().sin() * apparent_long.to_radians().sin())
        .asin()
        .to_degrees();

    let y = (obliquity.to_radians() / 2.0).tan().powi(2);
    let l0r = l0.to_radians();
    let eot = 4.0
        * (y * (2.0 * l0r).sin() - 2.0 * e * mr.sin()
            + 4.0 * e * y * mr.sin() * (2.0 * l0r).cos()
            - 0.5 * y * y * (4.0 * l0r).sin()
            - 1.25 * e * e * (2.0 * mr).sin())
        .to_degrees();
    (declination, eot)
}

/// Altitude/azimuth of the sun for an observer at `(lat, lon)` degrees,
/// east longitude positive.
pub fn solar_position(time: DateTime<Utc>, lat: f64, lon: f64) -> HorizontalPosition {
    let t = julian_centuries(time);
    let (declination, eot) = declination_and_eot(t);

    let minutes = time.hour() as f64 * 60.0
        + time.minute() as f64
        + time.second() as f64 / 60.0;
    let true_solar_minutes = (minutes + eot + 4.0 * lon).rem_euclid(1440.0);
    let hour_angle = true_solar_minutes / 4.0 - 180.0;

    horizontal_from_equatorial(declination, hour_angle, lat)
}

/// Convert (declination, hour angle) to altitude/azimuth for a latitude.
pub fn horizontal_from_equatorial(
    declination_deg: f64,
    hour_angle_deg: f64,
    lat_deg: f64,
) -> HorizontalPosition {
    let dec = declination_deg.to_radians();
    let ha = hour_angle_deg.to_radians();
    let lat = lat_deg.to_radians();

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    // Azimuth from north, clockwise
    let cos_az = (dec.sin() - altitude.sin() * lat.sin()) / (altitude.cos() * lat.cos()).max(1e-9);
    let mut azimuth = cos_az.clamp(-1.0, 1.0).acos().to_degrees();
    if ha.sin() > 0.0 {
        azimuth = 360.0 - azimuth;
    }

    HorizontalPosition {
        altitude_deg: altitude.to_degrees(),
        azimuth_deg: azimuth.rem_euclid(360.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
