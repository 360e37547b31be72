//! Floor-plan document model.
//!
//! The document is produced by an external 2D editor and consumed read-only
//! here. Plan coordinates are 2D (x, y) with elevations in the same unit;
//! see [`crate::math::plan_to_world`] for the world-space mapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::math::Polygon2;

/// Default room/ceiling height when neither room nor group specifies one.
pub const DEFAULT_HEIGHT: f32 = 96.0;

/// A complete floor-plan document: one group per elevation level plus
/// scene appearance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FloorPlanDocument {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub appearance: Appearance,
}

impl FloorPlanDocument {
    /// Parse a document from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All rooms across all groups with their owning group.
    pub fn all_rooms(&self) -> impl Iterator<Item = (&Group, &Room)> {
        self.groups
            .iter()
            .flat_map(|g| g.rooms.iter().map(move |r| (g, r)))
    }
}

/// One elevation level (floor) of the document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "group_id")]
    pub id: u32,
    #[serde(default)]
    pub elevation: f32,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub surfaces: Vec<Surface>,
    #[serde(default)]
    pub openings: Vec<Opening>,
    #[serde(default)]
    pub light_sources: Vec<LightSource>,
    #[serde(default)]
    pub trees: Vec<Tree>,
}

impl Group {
    /// Level height, falling back to the document default.
    pub fn resolved_height(&self) -> f32 {
        self.height.unwrap_or(DEFAULT_HEIGHT)
    }
}

/// A room: closed polygon with an origin offset and optional overrides.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "room_id")]
    pub id: u32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub points: Vec<PlanPoint>,
    #[serde(default)]
    pub elevation: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub sensor_id: Option<String>,
}

impl Room {
    /// Room polygon in absolute plan coordinates, CCW, zero-length edges
    /// removed.
    pub fn absolute_polygon(&self) -> Polygon2 {
        Polygon2::new(
            self.points
                .iter()
                .map(|p| Vec2::new(p.x + self.x, p.y + self.y))
                .collect(),
        )
        .dedup_points(1e-4)
        .ensure_ccw()
    }

    /// Floor elevation, falling back to the group.
    pub fn resolved_elevation(&self, group: &Group) -> f32 {
        self.elevation.unwrap_or(group.elevation)
    }

    /// Wall/ceiling height, falling back to the group.
    pub fn resolved_height(&self, group: &Group) -> f32 {
        self.height.unwrap_or_else(|| group.resolved_height())
    }

    /// Absolute ceiling elevation.
    pub fn ceiling_elevation(&self, group: &Group) -> f32 {
        self.resolved_elevation(group) + self.resolved_height(group)
    }
}

/// A 2D point in the document wire format.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PlanPoint {
    pub x: f32,
    pub y: f32,
}

/// A free-standing surface (patio, deck): flat when height is zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Surface {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub points: Vec<PlanPoint>,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "default_surface_color")]
    pub color: [f32; 3],
}

fn default_surface_color() -> [f32; 3] {
    [0.62, 0.60, 0.58]
}

impl Surface {
    pub fn absolute_polygon(&self) -> Polygon2 {
        Polygon2::new(
            self.points
                .iter()
                .map(|p| Vec2::new(p.x + self.x, p.y + self.y))
                .collect(),
        )
        .dedup_points(1e-4)
        .ensure_ccw()
    }
}

/// A door/window placement feature (point or 2-point span).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Opening {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub x2: Option<f32>,
    #[serde(default)]
    pub y2: Option<f32>,
}

/// A user-placed point light.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct LightSource {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Tree archetype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    Conical,
    #[default]
    Round,
    Oval,
}

/// A placed tree. The generator derives the full mesh hierarchy from these
/// five scalars plus the seed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Tree {
    #[serde(rename = "type", default)]
    pub kind: TreeKind,
    pub height: f32,
    pub diameter: f32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub seed: u32,
}

/// Roof construction style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofStyle {
    Flat,
    #[default]
    Hip,
}

/// Named weather mode selected by the document or live settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    #[default]
    None,
    Sunny,
    Cloudy,
    Rain,
    Snow,
}

/// Scene-level appearance settings carried by the document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Appearance {
    /// Building rotation in degrees, applied to celestial azimuths.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_roof_color")]
    pub roof_color: [f32; 3],
    #[serde(default)]
    pub roof_style: RoofStyle,
    #[serde(default = "default_siding_color")]
    pub siding_color: [f32; 3],
    #[serde(default = "default_ground_color")]
    pub ground_color: [f32; 3],
    #[serde(default)]
    pub weather: WeatherMode,
}

fn default_roof_color() -> [f32; 3] {
    [0.35, 0.23, 0.20]
}

fn default_siding_color() -> [f32; 3] {
    [0.87, 0.84, 0.78]
}

fn default_ground_color() -> [f32; 3] {
    [0.33, 0.45, 0.28]
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            roof_color: default_roof_color(),
            roof_style: RoofStyle::default(),
            siding_color: default_siding_color(),
            ground_color: default_ground_color(),
            weather: WeatherMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = FloorPlanDocument::from_json(
            r#"{
                "groups": [{
                    "group_id": 1,
                    "elevation": 0,
                    "rooms": [{
                        "room_id": 7,
                        "x": 10, "y": 20,
                        "points": [
                            {"x": 0, "y": 0},
                            {"x": 120, "y": 0},
                            {"x": 120, "y": 120},
                            {"x": 0, "y": 120}
                        ],
                        "sensor_id": "temp-7"
                    }]
                }],
                "appearance": {"roof_style": "hip", "weather": "snow"}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.groups.len(), 1);
        let room = &doc.groups[0].rooms[0];
        assert_eq!(room.id, 7);
        assert_eq!(room.sensor_id.as_deref(), Some("temp-7"));
        assert_eq!(doc.appearance.roof_style, RoofStyle::Hip);
        assert_eq!(doc.appearance.weather, WeatherMode::Snow);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(FloorPlanDocument::from_json("{not json").is_err());
    }

    #[test]
    fn test_absolute_polygon_applies_origin() {
        let room = Room {
            id: 1,
            x: 10.0,
            y: 20.0,
            points: vec![
                PlanPoint { x: 0.0, y: 0.0 },
                PlanPoint { x: 100.0, y: 0.0 },
                PlanPoint { x: 100.0, y: 100.0 },
                PlanPoint { x: 0.0, y: 100.0 },
            ],
            ..Default::default()
        };
        let poly = room.absolute_polygon();
        assert_eq!(poly.points[0], Vec2::new(10.0, 20.0));
        assert!(poly.is_outer());
    }

    #[test]
    fn test_absolute_polygon_normalizes_cw_input() {
        let room = Room {
            id: 1,
            points: vec![
                PlanPoint { x: 0.0, y: 100.0 },
                PlanPoint { x: 100.0, y: 100.0 },
                PlanPoint { x: 100.0, y: 0.0 },
                PlanPoint { x: 0.0, y: 0.0 },
            ],
            ..Default::default()
        };
        assert!(room.absolute_polygon().is_outer());
    }

    #[test]
    fn test_resolved_heights_fall_back() {
        let group = Group {
            id: 1,
            elevation: 100.0,
            height: Some(110.0),
            ..Default::default()
        };
        let room = Room {
            id: 1,
            ..Default::default()
        };
        assert_eq!(room.resolved_elevation(&group), 100.0);
        assert_eq!(room.resolved_height(&group), 110.0);
        assert_eq!(room.ceiling_elevation(&group), 210.0);

        let override_room = Room {
            id: 2,
            elevation: Some(0.0),
            height: Some(96.0),
            ..Default::default()
        };
        assert_eq!(override_room.ceiling_elevation(&group), 96.0);
    }

    #[test]
    fn test_group_height_default() {
        let group = Group::default();
        assert_eq!(group.resolved_height(), DEFAULT_HEIGHT);
    }
}
