//! Rendering
//!
//! Window, primitives and the Vulkan backend.

pub mod backends;
pub mod primitives;
pub mod window;

pub use backends::vulkan::{VulkanError, VulkanRenderer, VulkanResult};
pub use primitives::{Camera, CameraType, Vertex};
pub use window::{MovementKeys, Window, WindowError, WindowState};
