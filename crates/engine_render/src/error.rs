//! Render system errors.

use std::path::PathBuf;

use engine_graphics::GraphicsError;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A configured shader source file could not be read.
    #[error("failed to read shader source {path}: {source}")]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `update` was called after `destroy`.
    #[error("render system has been destroyed")]
    Destroyed,

    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}
