//! Asset loading errors.

use std::path::PathBuf;

use engine_component::ComponentError;
use engine_graphics::GraphicsError;

/// Errors raised while parsing asset files or turning them into components.
///
/// Every variant aborts the whole load: no partially built model is ever
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("failed to decode texture {path}: {reason}")]
    Texture { path: PathBuf, reason: String },

    /// A geometry group names a material the library does not define.
    #[error("group `{group}` uses material {material:?}, which is not in the material library")]
    MaterialNotFound {
        group: String,
        material: Option<String>,
    },

    /// A material has no diffuse map to build a texture from.
    #[error("material `{0}` has no diffuse texture")]
    MissingTexture(String),

    /// Stride, offsets or index ranges do not fit the coordinate data.
    #[error("invalid geometry layout: {0}")]
    InvalidLayout(String),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}
