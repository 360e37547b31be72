//! Planhaus - a procedural 3D building scene and environment engine
//!
//! Turns a 2D floor-plan document into renderable 3D scene state: exterior
//! walls, flat or hip roofs, procedurally grown trees, weather particles,
//! wind-driven mesh deformation, and date/location-driven sun, moon, and
//! star lighting. The entry point is [`scene::SceneEngine`].

pub mod core;
pub mod math;
pub mod plan;
pub mod geometry;
pub mod trees;
pub mod wind;
pub mod weather;
pub mod atmosphere;
pub mod scene;
