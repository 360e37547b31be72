//! Scene assembly and runtime: the engine, live settings, sensor heat
//! maps, and pointer picking.

pub mod engine;
pub mod heatmap;
pub mod raycast;
pub mod settings;

pub use engine::{CameraState, DataType, RoomLabel, SceneEngine};
pub use heatmap::{HeatmapGradient, LabelCache, LabelKind, SensorSeries};
pub use raycast::{ActiveRoom, RoomPicker};
pub use settings::SceneSettings;
