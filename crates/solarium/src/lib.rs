//! # Solarium
//!
//! A Vulkan bring-up renderer: window and surface setup, device selection,
//! swapchain lifecycle, and a textured draw loop with frames in flight.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use solarium::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     logging::init("info");
//!     let config = ApplicationConfig::new("Sol");
//!     let mut engine = Engine::new(&config)?;
//!     engine.run()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;

mod engine;

#[cfg(test)]
#[path = "../build_support.rs"]
mod build_support;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{ApplicationConfig, Config, ConfigError, RendererConfig, ShaderConfig, WindowConfig},
        foundation::{
            logging,
            math::{Mat4, Vec2, Vec3, Vec4},
            time::Timer,
        },
        render::{Camera, CameraType, VulkanRenderer, Window},
        Engine, EngineError,
    };
}
