//! Graphics and windowing error types.

use engine_component::ComponentError;

/// Errors raised by a [`GraphicsDevice`](crate::GraphicsDevice) or the
/// resource binder.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// A resource was requested before a context was made current.
    #[error("no graphics context is current")]
    NoContext,

    /// The backend could not create or attach a context to the window.
    #[error("failed to initialise graphics context: {0}")]
    Context(String),

    /// Shader compilation or program linking failed.
    #[error("shader program failed to build: {0}")]
    ShaderCompile(String),

    /// A handle was deleted twice or never belonged to this device.
    #[error("unknown or already deleted {kind} handle {raw}")]
    UnknownHandle {
        /// Which handle family (`"buffer"`, `"vertex array"`, ...).
        kind: &'static str,
        /// The raw backend identifier.
        raw: u32,
    },

    /// Any other backend failure.
    #[error("graphics backend error: {0}")]
    Backend(String),

    /// Storing an uploaded resource back into the world failed.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// Errors raised by a [`Windowing`](crate::Windowing) backend.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// The platform refused to create the window.
    #[error("failed to create window: {0}")]
    Create(String),
}
