//! Windowing and input seam.

use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// Window creation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl WindowConfig {
    /// Width divided by height, for camera projection.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Game Window".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// An open window. Not `Clone`: destroying it consumes the handle.
#[derive(Debug, PartialEq, Eq)]
pub struct WindowHandle {
    id: u32,
    width: u32,
    height: u32,
}

impl WindowHandle {
    /// Wrap a backend window id. Only windowing backends should call this.
    #[must_use]
    pub const fn from_raw(id: u32, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.id
    }

    /// Framebuffer size in pixels.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Keys the engine can bind actions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    W,
    A,
    S,
    D,
    Space,
    LeftShift,
    Up,
    Down,
    Left,
    Right,
    /// Any other key, by backend scancode.
    Other(u32),
}

/// State change reported for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

/// One input event, delivered by [`Windowing::poll_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, action: KeyAction },
    /// Absolute cursor position in window coordinates.
    MouseMoved { x: f64, y: f64 },
    Scrolled { dx: f64, dy: f64 },
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// Window lifecycle and event polling.
pub trait Windowing {
    /// # Errors
    ///
    /// Returns [`WindowError::Create`] if the platform refuses the window.
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle, WindowError>;

    fn should_close(&self, window: &WindowHandle) -> bool;

    fn set_should_close(&mut self, window: &WindowHandle, value: bool);

    /// Swap buffers to display the frame.
    fn present(&mut self, window: &WindowHandle);

    /// Drain pending input events.
    fn poll_events(&mut self, window: &WindowHandle) -> Vec<InputEvent>;

    fn destroy_window(&mut self, window: WindowHandle);
}
