//! # Application Configuration
//!
//! Window, renderer and engine settings. Every struct fills missing fields
//! from its `Default`, so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Config, ConfigError};

/// Directories searched for compiled shaders, in order
const SHADER_DIRS: [&str; 4] = ["target/shaders", "shaders", "resources/shaders", "../target/shaders"];

/// # Shader Configuration
///
/// Where the compiled SPIR-V lives and which vertex/fragment pair to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory scanned for shader sets
    pub directory: String,
    /// Stem of the shader set used by the pipeline (`shader` → `shader.vert.spv`)
    pub shader_set: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(directory: impl Into<String>, shader_set: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            shader_set: shader_set.into(),
        }
    }

    /// Pick the first existing shader directory, for binaries started from
    /// different working directories
    pub fn with_path_resolution(shader_set: &str) -> Self {
        let directory = SHADER_DIRS
            .iter()
            .find(|dir| Path::new(dir).is_dir())
            .unwrap_or(&SHADER_DIRS[0]);
        Self::new(*directory, shader_set)
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::with_path_resolution("shader")
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Whether the window can be resized
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Solarium".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

/// # Vulkan Renderer Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Application name for Vulkan instance creation
    pub application_name: String,
    /// Whether to enable Vulkan validation layers (`None` = debug builds only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_validation: Option<bool>,
    /// Frames the CPU may record ahead of the GPU
    pub max_frames_in_flight: usize,
    /// Use MAILBOX presentation when the surface supports it
    pub prefer_mailbox: bool,
    /// Texture sampled by the fragment shader
    pub texture_path: String,
    /// Shader configuration
    pub shaders: ShaderConfig,
}

impl RendererConfig {
    /// Create a new renderer configuration
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            enable_validation: None,
            max_frames_in_flight: 2,
            prefer_mailbox: true,
            texture_path: "resources/textures/textures.jpg".to_string(),
            shaders: ShaderConfig::default(),
        }
    }

    /// Set maximum frames in flight
    pub fn with_max_frames_in_flight(mut self, frames: usize) -> Self {
        self.max_frames_in_flight = frames;
        self
    }

    /// Enable or disable validation layers
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Resolved validation flag
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid("Application name cannot be empty".to_string()));
        }
        if !(1..=8).contains(&self.max_frames_in_flight) {
            return Err(ConfigError::Invalid(format!(
                "Max frames in flight must be between 1 and 8, got {}",
                self.max_frames_in_flight
            )));
        }
        if self.shaders.shader_set.is_empty() {
            return Err(ConfigError::Invalid("Shader set name cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new("Solarium")
    }
}

/// Core engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration read by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core settings
    pub engine: EngineSettings,
    /// Window settings
    pub window: WindowConfig,
    /// Rendering system configuration
    pub renderer: RendererConfig,
}

impl ApplicationConfig {
    /// Defaults with the given application name used for window and instance
    pub fn new(app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        Self {
            engine: EngineSettings::default(),
            window: WindowConfig {
                title: app_name.clone(),
                ..WindowConfig::default()
            },
            renderer: RendererConfig::new(app_name),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Window extent must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        self.renderer.validate()
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bring_up_settings() {
        let config = ApplicationConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.renderer.max_frames_in_flight, 2);
        assert_eq!(config.renderer.shaders.shader_set, "shader");
        assert_eq!(config.engine.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn named_config_titles_window() {
        let config = ApplicationConfig::new("Sol");
        assert_eq!(config.window.title, "Sol");
        assert_eq!(config.renderer.application_name, "Sol");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let text = r#"
            [window]
            width = 800

            [renderer]
            max_frames_in_flight = 3
            prefer_mailbox = false
        "#;
        let config = ApplicationConfig::from_str_with_format(text, "solarium.toml").unwrap();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.renderer.max_frames_in_flight, 3);
        assert!(!config.renderer.prefer_mailbox);
        assert_eq!(config.renderer.application_name, "Solarium");
    }

    #[test]
    fn ron_is_accepted() {
        let text = "(window: (title: \"ron\", width: 640, height: 480, resizable: false))";
        let config = ApplicationConfig::from_str_with_format(text, "app.ron").unwrap();
        assert_eq!(config.window.title, "ron");
        assert!(!config.window.resizable);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = ApplicationConfig::from_str_with_format("", "app.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let zero_frames = RendererConfig::default().with_max_frames_in_flight(0);
        assert!(matches!(zero_frames.validate(), Err(ConfigError::Invalid(_))));

        let too_many = RendererConfig::default().with_max_frames_in_flight(9);
        assert!(too_many.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());

        let mut unnamed = RendererConfig::default();
        unnamed.application_name.clear();
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn explicit_validation_flag_wins() {
        assert!(RendererConfig::default().with_validation(true).validation_enabled());
        assert!(!RendererConfig::default().with_validation(false).validation_enabled());
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let dir = std::env::temp_dir().join(format!("solarium-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solarium.toml");
        let path = path.to_str().unwrap();

        let mut config = ApplicationConfig::new("Sol");
        config.renderer.max_frames_in_flight = 3;
        config.save_to_file(path).unwrap();

        let loaded = ApplicationConfig::load_from_file(path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
