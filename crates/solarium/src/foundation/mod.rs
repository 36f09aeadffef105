//! Foundation module - Core utilities and types
//!
//! - Math types and projection helpers
//! - Frame timing
//! - Logging setup
//! - Cyclic noise shared with the shaders

pub mod logging;
pub mod math;
pub mod noise;
pub mod time;
