//! Live scene settings.
//!
//! Settings arrive from the host either one key at a time or as a bulk
//! map. Out-of-range numeric values are clamped to their documented range,
//! never rejected; only unknown keys or type mismatches are errors.

use serde_json::Value;

use crate::core::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneSettings {
    /// Cloud coverage, 0..1 of the cloud pool.
    pub cloud_density: f32,
    /// How strongly clouds darken the scene, 0..1.
    pub cloud_darkness: f32,
    /// Fog falloff, 0..1.
    pub fog_density: f32,
    pub fog_color: [f32; 3],
    /// Rain intensity, 0..1 of the rain pool.
    pub rain_density: f32,
    /// Snow intensity, 0..1 of the snow pool.
    pub snow_density: f32,
    /// Lightning strikes per minute, 0..30.
    pub lightning_frequency: f32,
    /// Wind speed, 0..10.
    pub wind_speed: f32,
    /// Wind azimuth in degrees, wrapped to 0..360.
    pub wind_direction: f32,
    pub tree_enabled: bool,
    pub tree_wobble: bool,
    /// Star count fraction, 0..1.
    pub star_density: f32,
    pub light_user_enabled: bool,
    pub light_user_cast_shadows: bool,
    pub random_seed: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            cloud_density: 0.3,
            cloud_darkness: 0.5,
            fog_density: 0.0,
            fog_color: [0.75, 0.78, 0.82],
            rain_density: 1.0,
            snow_density: 1.0,
            lightning_frequency: 0.0,
            wind_speed: 1.0,
            wind_direction: 270.0,
            tree_enabled: true,
            tree_wobble: true,
            star_density: 0.7,
            light_user_enabled: false,
            light_user_cast_shadows: false,
            random_seed: 0,
        }
    }
}

fn number(key: &str, value: &Value) -> Result<f32> {
    value
        .as_f64()
        .map(|f| f as f32)
        .ok_or_else(|| Error::Settings(format!("{key}: expected a number, got {value}")))
}

fn boolean(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::Settings(format!("{key}: expected a bool, got {value}")))
}

fn color(key: &str, value: &Value) -> Result<[f32; 3]> {
    let parts = value
        .as_array()
        .filter(|a| a.len() == 3)
        .ok_or_else(|| Error::Settings(format!("{key}: expected [r, g, b], got {value}")))?;
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = number(key, part)?.clamp(0.0, 1.0);
    }
    Ok(out)
}

impl SceneSettings {
    /// Apply one setting. Numeric values clamp to range; unknown keys and
    /// type mismatches are errors.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "cloud_density" => self.cloud_density = number(key, value)?.clamp(0.0, 1.0),
            "cloud_darkness" => self.cloud_darkness = number(key, value)?.clamp(0.0, 1.0),
            "fog_density" => self.fog_density = number(key, value)?.clamp(0.0, 1.0),
            "fog_color" => self.fog_color = color(key, value)?,
            "rain_density" => self.rain_density = number(key, value)?.clamp(0.0, 1.0),
            "snow_density" => self.snow_density = number(key, value)?.clamp(0.0, 1.0),
            "lightning_frequency" => {
                self.lightning_frequency = number(key, value)?.clamp(0.0, 30.0)
            }
            "wind_speed" => self.wind_speed = number(key, value)?.clamp(0.0, 10.0),
            "wind_direction" => self.wind_direction = number(key, value)?.rem_euclid(360.0),
            "tree_enabled" => self.tree_enabled = boolean(key, value)?,
            "tree_wobble" => self.tree_wobble = boolean(key, value)?,
            "star_density" => self.star_density = number(key, value)?.clamp(0.0, 1.0),
            "light_user_enabled" => self.light_user_enabled = boolean(key, value)?,
            "light_user_cast_shadows" => self.light_user_cast_shadows = boolean(key, value)?,
            "random_seed" => {
                self.random_seed = value
                    .as_u64()
                    .ok_or_else(|| {
                        Error::Settings(format!("{key}: expected an integer, got {value}"))
                    })? as u32
            }
            _ => return Err(Error::Settings(format!("unknown setting {key:?}"))),
        }
        Ok(())
    }

    /// Bulk application. Fails on the first bad entry; entries before it
    /// stay applied, matching incremental semantics.
    pub fn apply_map<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a Value)>,
    ) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
