//! Architectural geometry synthesis: exposed ceilings, exterior walls,
//! and roofs, all derived from the 2D floor plan.

pub mod exposure;
pub mod roof;
pub mod skeleton;
pub mod surfaces;
pub mod walls;

pub use exposure::ExposedCeilingArea;
pub use roof::RoofParams;
pub use skeleton::{straight_skeleton, Skeleton, SkeletonNode};
pub use walls::{RoomWalls, WallParams};

/// Default exterior wall thickness in plan units.
pub const WALL_THICKNESS: f32 = 6.0;
