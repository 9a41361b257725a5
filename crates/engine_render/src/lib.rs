//! # engine_render
//!
//! The per-frame [`RenderSystem`]: clear, bind the shader program, set the
//! camera uniforms and draw every entity that has a mesh. Meshes are
//! uploaded lazily and only once.

pub mod error;
pub mod shaders;
pub mod system;

pub use error::RenderError;
pub use system::{DEFAULT_CLEAR_COLOR, FrameStats, RenderConfig, RenderSystem};
