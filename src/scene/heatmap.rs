//! Sensor heat-map coloring and label caching.

use std::collections::HashMap;

/// Color for rooms with no sensor binding or no data at the current time.
pub const NEUTRAL_COLOR: [f32; 3] = [0.58, 0.58, 0.60];

/// Per-minute sensor samples keyed by `"HH:mm"`.
#[derive(Clone, Debug, Default)]
pub struct SensorSeries {
    values: HashMap<String, f32>,
}

impl SensorSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: HashMap<String, f32>) -> Self {
        Self { values }
    }

    pub fn insert(&mut self, hour: u32, minute: u32, value: f32) {
        self.values.insert(Self::key(hour, minute), value);
    }

    fn key(hour: u32, minute: u32) -> String {
        format!("{:02}:{:02}", hour % 24, minute % 60)
    }

    /// Averaged value for the minute bucket, if sampled.
    pub fn value_at(&self, hour: u32, minute: u32) -> Option<f32> {
        self.values.get(&Self::key(hour, minute)).copied()
    }
}

/// Fixed color-stop ramp with min/max-normalized lookup.
#[derive(Clone, Debug)]
pub struct HeatmapGradient {
    /// (normalized position, color), sorted by position.
    stops: Vec<(f32, [f32; 3])>,
}

impl Default for HeatmapGradient {
    /// Cool blue through green and yellow to hot red.
    fn default() -> Self {
        Self {
            stops: vec![
                (0.0, [0.18, 0.33, 0.80]),
                (0.35, [0.20, 0.65, 0.45]),
                (0.65, [0.90, 0.80, 0.25]),
                (1.0, [0.85, 0.22, 0.15]),
            ],
        }
    }
}

impl HeatmapGradient {
    /// Color for a value normalized into `[min, max]`. Missing values get
    /// [`NEUTRAL_COLOR`]; a degenerate range maps everything to the middle.
    pub fn color_for(&self, value: Option<f32>, min: f32, max: f32) -> [f32; 3] {
        let Some(value) = value else {
            return NEUTRAL_COLOR;
        };
        let span = max - min;
        let t = if span.abs() < 1e-6 {
            0.5
        } else {
            ((value - min) / span).clamp(0.0, 1.0)
        };
        self.sample(t)
    }

    fn sample(&self, t: f32) -> [f32; 3] {
        let mut prev = self.stops[0];
        for &stop in &self.stops {
            if t <= stop.0 {
                let span = stop.0 - prev.0;
                let f = if span < 1e-6 { 0.0 } else { (t - prev.0) / span };
                return [
                    prev.1[0] + (stop.1[0] - prev.1[0]) * f,
                    prev.1[1] + (stop.1[1] - prev.1[1]) * f,
                    prev.1[2] + (stop.1[2] - prev.1[2]) * f,
                ];
            }
            prev = stop;
        }
        self.stops[self.stops.len() - 1].1
    }
}

/// What a label displays; part of the cache key so a temperature label is
/// never reused for an occupancy value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Temperature,
    Occupancy,
}

/// Rendered label text cached by `(kind, value in tenths)`. Rebuilding the
/// same label every minute-tick would dominate refresh cost otherwise.
#[derive(Default)]
pub struct LabelCache {
    entries: HashMap<(LabelKind, i32), String>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a raw value: tenths, rounded.
    pub fn quantize(value: f32) -> i32 {
        (value * 10.0).round() as i32
    }

    pub fn get_or_render(&mut self, kind: LabelKind, value: f32) -> &str {
        let key = (kind, Self::quantize(value));
        self.entries.entry(key).or_insert_with(|| match kind {
            LabelKind::Temperature => format!("{:.1}°", key.1 as f32 / 10.0),
            LabelKind::Occupancy => format!("{}", (key.1 as f32 / 10.0).round() as i32),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
