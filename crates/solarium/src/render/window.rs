//! Window management using GLFW
//!
//! Creates the Vulkan-capable window, turns GLFW events into a per-frame
//! [`WindowState`] and exposes the surface/extension hooks the Vulkan
//! context needs.

use ash::vk;
use bitflags::bitflags;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The window itself could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

bitflags! {
    /// Movement keys currently held down
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MovementKeys: u8 {
        /// A or left arrow
        const LEFT = 1 << 0;
        /// D or right arrow
        const RIGHT = 1 << 1;
        /// W or up arrow
        const UP = 1 << 2;
        /// S or down arrow
        const DOWN = 1 << 3;
    }
}

impl MovementKeys {
    /// Map a GLFW key to the movement flag it drives
    pub fn from_key(key: glfw::Key) -> Self {
        match key {
            glfw::Key::A | glfw::Key::Left => Self::LEFT,
            glfw::Key::D | glfw::Key::Right => Self::RIGHT,
            glfw::Key::W | glfw::Key::Up => Self::UP,
            glfw::Key::S | glfw::Key::Down => Self::DOWN,
            _ => Self::empty(),
        }
    }
}

/// What happened since the previous poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowState {
    /// The framebuffer changed size
    pub resized: bool,
    /// Escape or the close button was pressed
    pub close_requested: bool,
    /// Movement keys held after processing all events
    pub keys: MovementKeys,
}

impl WindowState {
    /// Fold one GLFW event into the state
    pub fn apply(&mut self, event: &glfw::WindowEvent) {
        match *event {
            glfw::WindowEvent::FramebufferSize(..) | glfw::WindowEvent::Size(..) => {
                self.resized = true;
            }
            glfw::WindowEvent::Close
            | glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) => {
                self.close_requested = true;
            }
            glfw::WindowEvent::Key(key, _, glfw::Action::Press, _) => {
                self.keys.insert(MovementKeys::from_key(key));
            }
            glfw::WindowEvent::Key(key, _, glfw::Action::Release, _) => {
                self.keys.remove(MovementKeys::from_key(key));
            }
            _ => {}
        }
    }
}

/// GLFW window wrapper with proper resource management
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    keys: MovementKeys,
}

impl Window {
    /// Create a window without a client API so Vulkan can own the surface
    pub fn new(title: &str, width: u32, height: u32, resizable: bool) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(resizable));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_size_polling(true);
        window.set_framebuffer_size_polling(true);

        log::info!("Created window '{}' ({}x{})", title, width, height);

        Ok(Self {
            glfw,
            window,
            events,
            keys: MovementKeys::empty(),
        })
    }

    /// Whether the window has been asked to close
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Poll GLFW and summarize the pending events
    pub fn poll_events(&mut self) -> WindowState {
        self.glfw.poll_events();

        let mut state = WindowState {
            keys: self.keys,
            ..WindowState::default()
        };
        for (_, event) in glfw::flush_messages(&self.events) {
            state.apply(&event);
        }
        self.keys = state.keys;

        if state.close_requested {
            self.window.set_should_close(true);
        }
        state
    }

    /// Current framebuffer size in pixels
    pub fn framebuffer_extent(&self) -> vk::Extent2D {
        let (width, height) = self.window.get_framebuffer_size();
        vk::Extent2D {
            width: u32::try_from(width).unwrap_or(0),
            height: u32::try_from(height).unwrap_or(0),
        }
    }

    /// Block while the window is minimized (0x0 framebuffer)
    pub fn wait_while_minimized(&mut self) {
        let mut extent = self.framebuffer_extent();
        while (extent.width == 0 || extent.height == 0) && !self.window.should_close() {
            self.glfw.wait_events();
            extent = self.framebuffer_extent();
        }
    }

    /// Get required Vulkan instance extensions from GLFW
    pub fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or_else(|| WindowError::GlfwError("Vulkan is not available to GLFW".to_string()))
    }

    /// Create a Vulkan surface using GLFW's built-in functionality
    pub fn create_surface(&self, instance: vk::Instance) -> WindowResult<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        let result = self.window.create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::GlfwError(format!("Failed to create Vulkan surface: {result:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glfw::{Action, Key, Modifiers, WindowEvent};

    fn key(key: Key, action: Action) -> WindowEvent {
        WindowEvent::Key(key, 0, action, Modifiers::empty())
    }

    #[test]
    fn framebuffer_events_flag_resize() {
        let mut state = WindowState::default();
        state.apply(&WindowEvent::FramebufferSize(800, 600));
        assert!(state.resized);
        assert!(!state.close_requested);
    }

    #[test]
    fn escape_and_close_request_closing() {
        let mut state = WindowState::default();
        state.apply(&key(Key::Escape, Action::Press));
        assert!(state.close_requested);

        let mut state = WindowState::default();
        state.apply(&WindowEvent::Close);
        assert!(state.close_requested);
    }

    #[test]
    fn movement_keys_track_press_and_release() {
        let mut state = WindowState::default();
        state.apply(&key(Key::W, Action::Press));
        state.apply(&key(Key::Left, Action::Press));
        assert_eq!(state.keys, MovementKeys::UP | MovementKeys::LEFT);

        state.apply(&key(Key::W, Action::Release));
        assert_eq!(state.keys, MovementKeys::LEFT);

        // Repeats leave the set unchanged
        state.apply(&key(Key::Left, Action::Repeat));
        assert_eq!(state.keys, MovementKeys::LEFT);
    }

    #[test]
    fn unrelated_keys_map_to_nothing() {
        assert!(MovementKeys::from_key(Key::Space).is_empty());
        assert_eq!(MovementKeys::from_key(Key::S), MovementKeys::DOWN);
    }
}
