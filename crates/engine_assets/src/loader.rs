//! The asset-loading seam.

use std::path::Path;

use engine_graphics::TextureImage;

use crate::error::AssetError;
use crate::geometry::{GeometryDoc, MaterialLib};

/// Parses on-disk assets into engine-neutral documents.
///
/// Loaders never touch the graphics device; uploading is done by
/// [`load_model`](crate::load_model) and [`load_material`](crate::load_material).
pub trait AssetLoader {
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] or [`AssetError::Parse`].
    fn parse_geometry(&self, path: &Path) -> Result<GeometryDoc, AssetError>;

    /// Texture paths in the returned library resolve against `path`'s
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] or [`AssetError::Parse`].
    fn parse_material_library(&self, path: &Path) -> Result<MaterialLib, AssetError>;

    /// Decode an image file to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] or [`AssetError::Texture`].
    fn load_texture(&self, path: &Path) -> Result<TextureImage, AssetError>;
}
