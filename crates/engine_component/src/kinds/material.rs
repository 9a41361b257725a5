//! Surface material component.

use crate::handle::TextureHandle;

/// Diffuse/specular texture pair plus a Phong shininess exponent.
///
/// Building a material from texture files is the asset layer's job; this
/// factory only bundles already-uploaded handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: TextureHandle,
    pub specular: TextureHandle,
    pub shininess: f32,
}

impl Material {
    #[must_use]
    pub fn new(diffuse: TextureHandle, specular: TextureHandle, shininess: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
        }
    }
}
