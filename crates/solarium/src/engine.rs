//! Core engine implementation
//!
//! Owns the window, the renderer, the camera and the frame timer, and runs
//! the main loop until the window closes.

use thiserror::Error;

use crate::config::{ApplicationConfig, ConfigError};
use crate::foundation::math::Vec3;
use crate::foundation::time::Timer;
use crate::render::backends::vulkan::resources::SecondaryUniformBufferObject;
use crate::render::backends::vulkan::state::swapchain::aspect_ratio;
use crate::render::backends::vulkan::{VulkanError, VulkanRenderer};
use crate::render::primitives::{Camera, CameraType};
use crate::render::window::{Window, WindowError};

const CAMERA_FOV_DEGREES: f32 = 60.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 256.0;

/// Main engine struct
///
/// Field order is drop order: the renderer releases its surface before the
/// window goes away.
pub struct Engine {
    renderer: VulkanRenderer,
    camera: Camera,
    timer: Timer,
    window: Window,
}

impl Engine {
    /// Create the window, renderer and camera described by `config`
    pub fn new(config: &ApplicationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine '{}'...", config.renderer.application_name);

        let window_config = &config.window;
        let window = Window::new(
            &window_config.title,
            window_config.width,
            window_config.height,
            window_config.resizable,
        )?;
        let renderer = VulkanRenderer::new(&window, &config.renderer)?;

        let mut camera = Camera::new(CameraType::FirstPerson);
        camera.set_perspective(
            CAMERA_FOV_DEGREES,
            aspect_ratio(renderer.swapchain_extent()),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        camera.set_movement_speed(2.0);
        camera.set_position(Vec3::zeros());

        Ok(Self {
            renderer,
            camera,
            timer: Timer::new(),
            window,
        })
    }

    /// Run the main loop until the window is closed
    pub fn run(&mut self) -> Result<(), EngineError> {
        log::info!("Starting main loop...");

        while !self.window.should_close() {
            let state = self.window.poll_events();
            if state.resized {
                self.renderer.set_framebuffer_resized();
            }
            self.camera.keys = state.keys;

            self.timer.update();
            self.on_loop(self.timer.delta_time())?;
        }

        self.renderer.wait_idle()?;
        log::info!(
            "Main loop finished after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        Ok(())
    }

    /// One iteration: move the camera, then draw
    fn on_loop(&mut self, delta_time: f32) -> Result<(), EngineError> {
        self.camera.update(delta_time);
        self.camera.update_aspect_ratio(aspect_ratio(self.renderer.swapchain_extent()));

        let secondary = SecondaryUniformBufferObject::from_view(&self.camera.matrices.view);
        self.renderer
            .draw_frame(&mut self.window, self.timer.elapsed_since_start(), &secondary)?;
        Ok(())
    }

    /// Request the loop to stop after the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.window.set_should_close(true);
    }

    /// Get the camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Get the renderer
    pub fn renderer(&self) -> &VulkanRenderer {
        &self.renderer
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Window or GLFW failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Vulkan failure
    #[error("Rendering error: {0}")]
    Vulkan(#[from] VulkanError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected_before_any_window_exists() {
        let mut config = ApplicationConfig::new("Sol");
        config.renderer.max_frames_in_flight = 0;

        let error = Engine::new(&config).err();
        assert!(matches!(error, Some(EngineError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn errors_name_their_layer() {
        let error = EngineError::from(VulkanError::NoSuitableDevice);
        assert_eq!(error.to_string(), "Rendering error: No suitable GPU found");

        let error = EngineError::from(WindowError::CreationFailed);
        assert_eq!(error.to_string(), "Window error: Window creation failed");
    }
}
