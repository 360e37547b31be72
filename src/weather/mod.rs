//! Weather state: mode profiles, eased transitions, precipitation pools,
//! clouds, and snow cover.

pub mod clouds;
pub mod particles;

use crate::plan::WeatherMode;

use clouds::CloudField;
use particles::{ParticlePool, ParticleVolume};

/// Seconds a full profile transition takes.
pub const TRANSITION_SECS: f32 = 60.0;
/// Color surfaces blend toward under snow cover.
pub const SNOW_COLOR: [f32; 3] = [0.93, 0.95, 0.97];
/// Snow tint strength for roofs, ground, and other hard surfaces.
pub const SNOW_TINT_HARD: f32 = 0.85;
/// Snow tint strength for foliage, which sheds snow.
pub const SNOW_TINT_FOLIAGE: f32 = 0.45;

/// Smoothing rate for the snow cover blend, per second.
const SNOW_COVER_RATE: f32 = 0.05;
/// How strongly full cloud cover dims celestial light.
const CLOUD_DIMMING: f32 = 0.6;

const RAIN_CAPACITY: usize = 600;
const SNOW_CAPACITY: usize = 400;
const CLOUD_CAPACITY: usize = 16;

/// Target particle counts for a weather mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherProfile {
    pub clouds: f32,
    pub rain: f32,
    pub snow: f32,
}

impl WeatherProfile {
    pub fn for_mode(mode: WeatherMode) -> Self {
        match mode {
            WeatherMode::None => Self {
                clouds: 0.0,
                rain: 0.0,
                snow: 0.0,
            },
            WeatherMode::Sunny => Self {
                clouds: 3.0,
                rain: 0.0,
                snow: 0.0,
            },
            WeatherMode::Cloudy => Self {
                clouds: CLOUD_CAPACITY as f32,
                rain: 0.0,
                snow: 0.0,
            },
            WeatherMode::Rain => Self {
                clouds: 12.0,
                rain: RAIN_CAPACITY as f32,
                snow: 0.0,
            },
            WeatherMode::Snow => Self {
                clouds: 10.0,
                rain: 0.0,
                snow: SNOW_CAPACITY as f32,
            },
        }
    }

    fn lerp(&self, other: &WeatherProfile, t: f32) -> WeatherProfile {
        let t = t.clamp(0.0, 1.0);
        WeatherProfile {
            clouds: self.clouds + (other.clouds - self.clouds) * t,
            rain: self.rain + (other.rain - self.rain) * t,
            snow: self.snow + (other.snow - self.snow) * t,
        }
    }
}

/// Linearly tint a base color toward [`SNOW_COLOR`].
pub fn apply_snow_tint(base: [f32; 3], blend: f32, strength: f32) -> [f32; 3] {
    let t = (blend * strength).clamp(0.0, 1.0);
    [
        base[0] + (SNOW_COLOR[0] - base[0]) * t,
        base[1] + (SNOW_COLOR[1] - base[1]) * t,
        base[2] + (SNOW_COLOR[2] - base[2]) * t,
    ]
}

/// Weather simulation for one scene.
pub struct WeatherSystem {
    mode: WeatherMode,
    start: WeatherProfile,
    target: WeatherProfile,
    transition_started: f32,
    pub rain: ParticlePool,
    pub snow: ParticlePool,
    pub clouds: CloudField,
    snow_cover: f32,
}

impl WeatherSystem {
    pub fn new(mode: WeatherMode, now: f32, seed: u32) -> Self {
        let volume = ParticleVolume {
            half_extent: 500.0,
            height: 400.0,
        };
        let profile = WeatherProfile::for_mode(mode);
        Self {
            mode,
            start: profile,
            target: profile,
            transition_started: now,
            rain: ParticlePool::new(RAIN_CAPACITY, volume, (120.0, 200.0), 8.0, seed),
            snow: ParticlePool::new(SNOW_CAPACITY, volume, (15.0, 35.0), 6.0, seed.wrapping_add(1)),
            clouds: CloudField::new(CLOUD_CAPACITY, 380.0, 700.0, seed.wrapping_add(2)),
            snow_cover: 0.0,
        }
    }

    pub fn mode(&self) -> WeatherMode {
        self.mode
    }

    /// Switch modes. The transition starts from the counts currently on
    /// screen, so switching mid-transition never snaps.
    pub fn set_mode(&mut self, mode: WeatherMode, now: f32) {
        if mode == self.mode {
            return;
        }
        self.start = self.current_profile(now);
        self.target = WeatherProfile::for_mode(mode);
        self.transition_started = now;
        self.mode = mode;
    }

    /// Interpolated particle counts at `now`, clamped to the start/target
    /// envelope.
    pub fn current_profile(&self, now: f32) -> WeatherProfile {
        let t = (now - self.transition_started) / TRANSITION_SECS;
        self.start.lerp(&self.target, t)
    }

    /// Advance particle pools and the snow cover blend.
    pub fn update(&mut self, now: f32, dt: f32) {
        let profile = self.current_profile(now);
        if profile.rain > 0.0 {
            self.rain.advance(dt);
        }
        if profile.snow > 0.0 {
            self.snow.advance(dt);
        }
        let snow_fraction = profile.snow / SNOW_CAPACITY as f32;
        self.snow_cover += (snow_fraction - self.snow_cover) * (dt * SNOW_COVER_RATE).min(1.0);
    }

    pub fn rain_draw_count(&self, now: f32) -> usize {
        self.current_profile(now).rain.round() as usize
    }

    pub fn snow_draw_count(&self, now: f32) -> usize {
        self.current_profile(now).snow.round() as usize
    }

    pub fn cloud_draw_count(&self, now: f32) -> usize {
        self.current_profile(now).clouds.round() as usize
    }

    /// Smoothed snow accumulation in [0, 1].
    pub fn snow_cover_blend(&self) -> f32 {
        self.snow_cover.clamp(0.0, 1.0)
    }

    /// Multiplier applied to celestial light intensity: 1 under clear sky,
    /// dimmer as cloud count approaches capacity.
    pub fn cloud_dimming(&self, now: f32) -> f32 {
        let fraction = self.current_profile(now).clouds / CLOUD_CAPACITY as f32;
        1.0 - fraction.clamp(0.0, 1.0) * CLOUD_DIMMING
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
