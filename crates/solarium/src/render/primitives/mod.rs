//! Core primitive types for rendering
//!
//! The vertex format, the quad geometry and the camera.

pub mod camera;
pub mod mesh;

pub use camera::{Camera, CameraMatrices, CameraType};
pub use mesh::{Vertex, QUAD_INDICES, QUAD_VERTICES};
