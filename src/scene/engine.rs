//! Scene engine: owns the document, all derived geometry, and the
//! environmental systems, and advances them with a single per-frame tick.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::atmosphere::CelestialSystem;
use crate::core::Result;
use crate::geometry::{self, roof::RoofParams, walls::RoomWalls, walls::WallParams};
use crate::math::mesh::{polygon_cap, MeshData};
use crate::math::polygon::Polygon2;
use crate::math::Ray;
use crate::plan::FloorPlanDocument;
use crate::trees::{TreeGenerator, TreeParams};
use crate::weather::{apply_snow_tint, WeatherSystem, SNOW_TINT_FOLIAGE, SNOW_TINT_HARD};
use crate::wind::{WindMeshParams, WindSystem};

use super::heatmap::{HeatmapGradient, LabelCache, LabelKind, SensorSeries, NEUTRAL_COLOR};
use super::raycast::{ActiveRoom, RoomPicker};
use super::settings::SceneSettings;

/// How far the ground plane extends past the origin.
const GROUND_EXTENT: f32 = 2000.0;
/// Camera easing rate toward its goal, per second.
const CAMERA_DAMPING: f32 = 4.0;
/// Auto-rotate rate, degrees per second.
const AUTO_ROTATE_DEG_PER_SEC: f32 = 6.0;
/// Snow tint is reapplied when the blend moved at least this much.
const SNOW_REAPPLY_THRESHOLD: f32 = 0.01;

/// Orbit camera state, exposed so the host can persist and restore it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub distance: f32,
    pub target: [f32; 3],
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            yaw_deg: 45.0,
            pitch_deg: -35.0,
            distance: 600.0,
            target: [0.0, 48.0, 0.0],
        }
    }
}

impl CameraState {
    fn ease_toward(&mut self, goal: &CameraState, blend: f32) {
        self.yaw_deg += (goal.yaw_deg - self.yaw_deg) * blend;
        self.pitch_deg += (goal.pitch_deg - self.pitch_deg) * blend;
        self.distance += (goal.distance - self.distance) * blend;
        for (c, g) in self.target.iter_mut().zip(goal.target) {
            *c += (g - *c) * blend;
        }
    }
}

/// Which sensor quantity the heat map displays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataType {
    #[default]
    Temperature,
    Occupancy,
}

impl DataType {
    fn label_kind(self) -> LabelKind {
        match self {
            DataType::Temperature => LabelKind::Temperature,
            DataType::Occupancy => LabelKind::Occupancy,
        }
    }
}

struct RoomFloor {
    group_id: u32,
    room_id: u32,
    sensor_id: Option<String>,
    mesh: MeshData,
}

struct SurfaceEntry {
    base_color: [f32; 3],
    mesh: MeshData,
}

struct TreeMeshEntry {
    wind_id: u64,
    base_color: [f32; 3],
    foliage: bool,
    mesh: MeshData,
}

/// A room label ready for the host to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomLabel {
    pub room_id: u32,
    pub text: String,
}

pub struct SceneEngine {
    document: FloorPlanDocument,
    settings: SceneSettings,

    base_date: DateTime<Utc>,
    celestial: CelestialSystem,
    weather: WeatherSystem,
    wind: WindSystem,
    picker: RoomPicker,
    gradient: HeatmapGradient,
    label_cache: LabelCache,

    sensor_data: HashMap<String, SensorSeries>,
    data_type: DataType,
    heat_min: f32,
    heat_max: f32,
    labels_visible: bool,

    walls: Vec<RoomWalls>,
    roofs: Vec<MeshData>,
    surfaces: Vec<SurfaceEntry>,
    ground: MeshData,
    trees: Vec<TreeMeshEntry>,
    room_floors: Vec<RoomFloor>,
    room_labels: Vec<RoomLabel>,

    camera: CameraState,
    camera_goal: CameraState,
    auto_rotate: bool,
    layer_visibility: HashMap<String, bool>,

    pointer_ray: Option<Ray>,
    active_room: Option<ActiveRoom>,

    clock: f32,
    last_minute: Option<i64>,
    refresh_requested: bool,
    last_snow_applied: f32,
    disposed: bool,
}

impl SceneEngine {
    pub fn new(document: FloorPlanDocument, settings: SceneSettings) -> Result<Self> {
        let weather = WeatherSystem::new(document.appearance.weather, 0.0, settings.random_seed);
        let celestial = CelestialSystem::new(
            0.0,
            0.0,
            document.appearance.rotation,
            settings.random_seed,
        );
        let mut engine = Self {
            document,
            settings,
            base_date: Utc::now(),
            celestial,
            weather,
            wind: WindSystem::new(),
            picker: RoomPicker::new(),
            gradient: HeatmapGradient::default(),
            label_cache: LabelCache::new(),
            sensor_data: HashMap::new(),
            data_type: DataType::default(),
            heat_min: 0.0,
            heat_max: 100.0,
            labels_visible: true,
            walls: Vec::new(),
            roofs: Vec::new(),
            surfaces: Vec::new(),
            ground: MeshData::new(),
            trees: Vec::new(),
            room_floors: Vec::new(),
            room_labels: Vec::new(),
            camera: CameraState::default(),
            camera_goal: CameraState::default(),
            auto_rotate: false,
            layer_visibility: HashMap::new(),
            pointer_ray: None,
            active_room: None,
            clock: 0.0,
            last_minute: None,
            refresh_requested: true,
            last_snow_applied: 0.0,
            disposed: false,
        };
        engine.rebuild();
        Ok(engine)
    }

    // -----------------------------------------------------------------
    // Structural rebuild
    // -----------------------------------------------------------------

    /// Full reconstruction from the current document. Idempotent; the
    /// camera is untouched.
    pub fn rebuild(&mut self) {
        if self.disposed {
            return;
        }
        self.picker.clear();
        self.wind.unregister_all();
        self.walls.clear();
        self.roofs.clear();
        self.surfaces.clear();
        self.trees.clear();
        self.room_floors.clear();
        self.room_labels.clear();

        let appearance = self.document.appearance.clone();

        let exposed = geometry::exposure::solve(&self.document);
        self.roofs = geometry::roof::synthesize(
            &exposed,
            &RoofParams {
                style: appearance.roof_style,
                color: appearance.roof_color,
                ..Default::default()
            },
        );

        let wall_params = WallParams {
            color: appearance.siding_color,
            ..Default::default()
        };
        for group in &self.document.groups {
            self.walls.extend(geometry::walls::synthesize(group, &wall_params));
            for mesh in geometry::surfaces::synthesize(group) {
                let base_color = mesh
                    .vertices
                    .first()
                    .map(|v| v.color)
                    .unwrap_or([0.0; 3]);
                self.surfaces.push(SurfaceEntry { base_color, mesh });
            }
        }

        self.ground = ground_plane(appearance.ground_color);

        if self.settings.tree_enabled {
            self.build_trees();
        }

        // Room floors drive both hover picking and heat-map coloring
        for group in &self.document.groups {
            for room in &group.rooms {
                let poly = room.absolute_polygon();
                if poly.is_degenerate() {
                    continue;
                }
                let elevation = room.resolved_elevation(group) + 0.5;
                let mesh = polygon_cap(&poly, &[], elevation, true, NEUTRAL_COLOR);
                self.picker.register(group.id, room.id, mesh.clone());
                self.room_floors.push(RoomFloor {
                    group_id: group.id,
                    room_id: room.id,
                    sensor_id: room.sensor_id.clone(),
                    mesh,
                });
            }
        }

        self.weather.set_mode(appearance.weather, self.clock);
        self.celestial.set_building_rotation(appearance.rotation);
        self.last_snow_applied = -1.0; // force a tint pass
        self.refresh_requested = true;
    }

    fn build_trees(&mut self) {
        let generator = TreeGenerator::new(TreeParams::default());
        let month = self.base_date.month();
        let day = self.base_date.day();
        let mut next_id: u64 = 1;
        for group in &self.document.groups {
            for tree in &group.trees {
                let generated = generator.generate(tree, group.elevation, month, day);
                // Hints line up with the non-empty meshes, in this order
                let mut meshes = Vec::new();
                for mesh in [Some(generated.trunk), Some(generated.branches), generated.canopy]
                    .into_iter()
                    .flatten()
                {
                    if !mesh.is_empty() {
                        meshes.push(mesh);
                    }
                }
                for (mesh, hint) in meshes.into_iter().zip(generated.parts) {
                    let id = next_id;
                    next_id += 1;
                    self.wind.register(
                        id,
                        &mesh,
                        WindMeshParams {
                            base_elevation: group.elevation,
                            height: hint.height,
                            stiffness: hint.stiffness,
                            max_sway_ratio: hint.max_sway_ratio,
                        },
                    );
                    let foliage = hint.role == crate::trees::PartRole::Canopy;
                    let base_color = mesh
                        .vertices
                        .first()
                        .map(|v| v.color)
                        .unwrap_or([0.0; 3]);
                    self.trees.push(TreeMeshEntry {
                        wind_id: id,
                        base_color,
                        foliage,
                        mesh,
                    });
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Per-frame tick
    // -----------------------------------------------------------------

    /// Advance the scene. `now` is the scene clock in seconds since
    /// engine start, `dt` the frame delta. No-op after `dispose`.
    pub fn tick(&mut self, now: f32, dt: f32) {
        if self.disposed {
            return;
        }
        self.clock = now;

        // 1. Camera damping
        if self.auto_rotate {
            self.camera_goal.yaw_deg =
                (self.camera_goal.yaw_deg + AUTO_ROTATE_DEG_PER_SEC * dt).rem_euclid(360.0);
        }
        let blend = (dt * CAMERA_DAMPING).clamp(0.0, 1.0);
        let goal = self.camera_goal;
        self.camera.ease_toward(&goal, blend);

        // 2. Hover raycast, interactive meshes only
        self.active_room = self.pointer_ray.as_ref().and_then(|r| self.picker.pick(r));

        // 3. Celestial lighting, then weather
        let date = self.simulated_date(now);
        self.celestial.update(date, dt, self.effective_dimming(now));
        self.weather.update(now, dt);

        // 4. Wind deformation
        for entry in &mut self.trees {
            self.wind.apply(
                entry.wind_id,
                &mut entry.mesh,
                self.settings.wind_speed,
                self.settings.wind_direction,
                now,
                self.settings.tree_wobble,
            );
        }

        // 5. Snow tinting when accumulation visibly changed
        let blend = self.weather.snow_cover_blend();
        if (blend - self.last_snow_applied).abs() > SNOW_REAPPLY_THRESHOLD {
            self.apply_snow(blend);
            self.last_snow_applied = blend;
        }

        // 6. Sensor recolor on minute change or explicit refresh
        let minute = (self.base_date.timestamp() + now as i64).div_euclid(60);
        if self.refresh_requested || self.last_minute != Some(minute) {
            self.refresh_rooms(date);
            self.last_minute = Some(minute);
            self.refresh_requested = false;
        }
    }

    fn simulated_date(&self, now: f32) -> DateTime<Utc> {
        self.base_date + Duration::milliseconds((now * 1000.0) as i64)
    }

    /// Cloud dimming with the user's darkness setting applied. The default
    /// darkness of 0.5 reproduces the weather system's own factor.
    fn effective_dimming(&self, now: f32) -> f32 {
        let deficit = 1.0 - self.weather.cloud_dimming(now);
        (1.0 - deficit * self.settings.cloud_darkness * 2.0).clamp(0.0, 1.0)
    }

    fn apply_snow(&mut self, blend: f32) {
        let appearance = &self.document.appearance;
        let roof_color = apply_snow_tint(appearance.roof_color, blend, SNOW_TINT_HARD);
        for roof in &mut self.roofs {
            roof.set_color(roof_color);
        }
        self.ground
            .set_color(apply_snow_tint(appearance.ground_color, blend, SNOW_TINT_HARD));
        for surface in &mut self.surfaces {
            let tinted = apply_snow_tint(surface.base_color, blend, SNOW_TINT_HARD);
            surface.mesh.set_color(tinted);
        }
        for entry in &mut self.trees {
            if entry.foliage {
                entry
                    .mesh
                    .set_color(apply_snow_tint(entry.base_color, blend, SNOW_TINT_FOLIAGE));
            }
        }
    }

    fn refresh_rooms(&mut self, date: DateTime<Utc>) {
        self.room_labels.clear();
        let hour = date.hour();
        let minute = date.minute();
        let kind = self.data_type.label_kind();
        for floor in &mut self.room_floors {
            let value = floor
                .sensor_id
                .as_ref()
                .and_then(|id| self.sensor_data.get(id))
                .and_then(|series| series.value_at(hour, minute));
            let color = self.gradient.color_for(value, self.heat_min, self.heat_max);
            floor.mesh.set_color(color);
            if self.labels_visible {
                if let Some(value) = value {
                    let text = self.label_cache.get_or_render(kind, value).to_owned();
                    self.room_labels.push(RoomLabel {
                        room_id: floor.room_id,
                        text,
                    });
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Host interface
    // -----------------------------------------------------------------

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.base_date = date;
        self.refresh_requested = true;
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64) {
        self.celestial.set_location(latitude, longitude);
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
        self.refresh_requested = true;
    }

    pub fn set_heat_map_min(&mut self, value: f32) {
        self.heat_min = value;
        self.refresh_requested = true;
    }

    pub fn set_heat_map_max(&mut self, value: f32) {
        self.heat_max = value;
        self.refresh_requested = true;
    }

    pub fn set_layer_visible(&mut self, layer: &str, visible: bool) {
        self.layer_visibility.insert(layer.to_owned(), visible);
    }

    pub fn layer_visible(&self, layer: &str) -> bool {
        self.layer_visibility.get(layer).copied().unwrap_or(true)
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn set_labels(&mut self, visible: bool) {
        self.labels_visible = visible;
        self.refresh_requested = true;
    }

    pub fn get_camera_state(&self) -> CameraState {
        self.camera
    }

    /// Jump the camera goal; the current camera eases toward it.
    pub fn set_camera_state(&mut self, state: CameraState) {
        self.camera_goal = state;
    }

    /// Replace the document and rebuild. The camera is preserved.
    pub fn set_document(&mut self, document: FloorPlanDocument) {
        self.document = document;
        self.rebuild();
    }

    /// Bind sensor series by sensor id.
    pub fn set_sensor_data(&mut self, data: HashMap<String, SensorSeries>) {
        self.sensor_data = data;
        self.refresh_requested = true;
    }

    /// Apply one live setting. Settings that change structure trigger a
    /// rebuild; a new seed re-rolls the seeded subsystems; the rest take
    /// effect on the next tick.
    pub fn set_scene_setting(&mut self, key: &str, value: &Value) -> Result<()> {
        self.settings.set(key, value)?;
        match key {
            "tree_enabled" => self.rebuild(),
            "random_seed" => {
                let seed = self.settings.random_seed;
                self.weather =
                    WeatherSystem::new(self.document.appearance.weather, self.clock, seed);
                self.celestial.reseed_stars(seed);
                self.last_snow_applied = -1.0;
            }
            _ => {}
        }
        Ok(())
    }

    /// Full structural rebuild, preserving the camera. Also the retry
    /// path after a degraded build (roof fallback).
    pub fn rerender(&mut self) {
        self.rebuild();
    }

    /// Feed the current pointer ray, or `None` when the pointer left the
    /// viewport.
    pub fn set_pointer_ray(&mut self, ray: Option<Ray>) {
        self.pointer_ray = ray;
        if ray.is_none() {
            self.active_room = None;
        }
    }

    pub fn get_active_room(&self) -> Option<ActiveRoom> {
        self.active_room
    }

    pub fn get_snow_cover_blend(&self) -> f32 {
        self.weather.snow_cover_blend()
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Particle/sprite draw counts, scaled by the user density settings.
    pub fn rain_draw_count(&self) -> usize {
        scaled(self.weather.rain_draw_count(self.clock), self.settings.rain_density)
    }

    pub fn snow_draw_count(&self) -> usize {
        scaled(self.weather.snow_draw_count(self.clock), self.settings.snow_density)
    }

    pub fn cloud_draw_count(&self) -> usize {
        scaled(self.weather.cloud_draw_count(self.clock), self.settings.cloud_density * 2.0)
    }

    pub fn star_draw_count(&self) -> usize {
        scaled(self.celestial.stars.stars().len(), self.settings.star_density)
    }

    pub fn room_labels(&self) -> &[RoomLabel] {
        &self.room_labels
    }

    pub fn walls(&self) -> &[RoomWalls] {
        &self.walls
    }

    pub fn roofs(&self) -> &[MeshData] {
        &self.roofs
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &MeshData> {
        self.surfaces.iter().map(|s| &s.mesh)
    }

    pub fn ground(&self) -> &MeshData {
        &self.ground
    }

    pub fn tree_meshes(&self) -> impl Iterator<Item = &MeshData> {
        self.trees.iter().map(|t| &t.mesh)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Synchronously drop all mesh, label, and particle storage and mark
    /// the engine dead. Every later call is a no-op.
    pub fn dispose(&mut self) {
        self.walls.clear();
        self.roofs.clear();
        self.surfaces.clear();
        self.ground = MeshData::new();
        self.trees.clear();
        self.room_floors.clear();
        self.room_labels.clear();
        self.picker.clear();
        self.wind.unregister_all();
        self.label_cache.clear();
        self.active_room = None;
        self.disposed = true;
    }
}

fn scaled(count: usize, factor: f32) -> usize {
    (count as f32 * factor.clamp(0.0, 1.0)).round() as usize
}

fn ground_plane(color: [f32; 3]) -> MeshData {
    let half = GROUND_EXTENT;
    polygon_cap(
        &Polygon2::new(vec![
            glam::Vec2::new(-half, -half),
            glam::Vec2::new(half, -half),
            glam::Vec2::new(half, half),
            glam::Vec2::new(-half, half),
        ]),
        &[],
        -0.05,
        true,
        color,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
