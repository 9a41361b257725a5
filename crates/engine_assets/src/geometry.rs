//! Parsed, format-independent asset documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use engine_component::Vertex;

use crate::error::AssetError;

const FLOAT_BYTES: usize = std::mem::size_of::<f32>();

/// A named run of indices sharing one material. One group is one draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryGroup {
    pub name: String,
    /// First index of the group in [`GeometryDoc::indices`].
    pub index_begin: usize,
    pub index_count: usize,
    /// Material name from the geometry file, `None` if it could not be resolved.
    pub material: Option<String>,
}

/// Geometry decoded from a model file.
///
/// `coords` holds interleaved vertex attributes. Position is always the
/// first three floats of a vertex; stride and attribute offsets are in
/// bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDoc {
    pub coords: Vec<f32>,
    pub indices: Vec<u32>,
    pub stride_bytes: usize,
    pub tex_offset_bytes: usize,
    pub normal_offset_bytes: usize,
    pub has_texcoords: bool,
    pub has_normals: bool,
    pub groups: Vec<GeometryGroup>,
}

/// Attribute layout of a [`GeometryDoc`] in floats rather than bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FloatLayout {
    pub stride: usize,
    pub tex: Option<usize>,
    pub normal: Option<usize>,
}

impl GeometryDoc {
    /// A document using the engine's own [`Vertex`] layout.
    #[must_use]
    pub fn interleaved(coords: Vec<f32>, indices: Vec<u32>, groups: Vec<GeometryGroup>) -> Self {
        Self {
            coords,
            indices,
            stride_bytes: Vertex::STRIDE_BYTES,
            tex_offset_bytes: Vertex::TEX_COORDS_OFFSET,
            normal_offset_bytes: Vertex::NORMAL_OFFSET,
            has_texcoords: true,
            has_normals: true,
            groups,
        }
    }

    /// Number of whole vertices in `coords`.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self.stride_bytes / FLOAT_BYTES {
            0 => 0,
            stride => self.coords.len() / stride,
        }
    }

    /// Convert the byte layout to float offsets and check it fits.
    pub(crate) fn float_layout(&self) -> Result<FloatLayout, AssetError> {
        for (what, bytes) in [
            ("stride", self.stride_bytes),
            ("texcoord offset", self.tex_offset_bytes),
            ("normal offset", self.normal_offset_bytes),
        ] {
            if bytes % FLOAT_BYTES != 0 {
                return Err(AssetError::InvalidLayout(format!(
                    "{what} of {bytes} bytes is not a whole number of floats"
                )));
            }
        }

        let stride = self.stride_bytes / FLOAT_BYTES;
        if stride < 3 {
            return Err(AssetError::InvalidLayout(format!(
                "stride of {stride} floats cannot hold a position"
            )));
        }
        if self.coords.len() % stride != 0 {
            return Err(AssetError::InvalidLayout(format!(
                "{} coordinates do not divide into vertices of {stride} floats",
                self.coords.len()
            )));
        }

        let attribute = |present: bool, offset_bytes: usize, width: usize, what: &str| {
            if !present {
                return Ok(None);
            }
            let offset = offset_bytes / FLOAT_BYTES;
            if offset + width > stride {
                return Err(AssetError::InvalidLayout(format!(
                    "{what} at float {offset} overruns a stride of {stride}"
                )));
            }
            Ok(Some(offset))
        };

        Ok(FloatLayout {
            stride,
            tex: attribute(self.has_texcoords, self.tex_offset_bytes, 2, "texcoord")?,
            normal: attribute(self.has_normals, self.normal_offset_bytes, 3, "normal")?,
        })
    }
}

/// One material definition from a material library.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDef {
    pub name: String,
    /// Diffuse texture file, relative to the library's directory.
    pub diffuse_map: Option<String>,
    /// Specular texture file, relative to the library's directory.
    pub specular_map: Option<String>,
    pub shininess: Option<f32>,
}

impl MaterialDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_map: None,
            specular_map: None,
            shininess: None,
        }
    }

    #[must_use]
    pub fn with_diffuse_map(mut self, file: impl Into<String>) -> Self {
        self.diffuse_map = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_specular_map(mut self, file: impl Into<String>) -> Self {
        self.specular_map = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = Some(shininess);
        self
    }
}

/// Materials by name, plus the directory their texture paths are relative to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLib {
    base_dir: PathBuf,
    materials: HashMap<String, MaterialDef>,
}

impl MaterialLib {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            materials: HashMap::new(),
        }
    }

    /// Add a definition, replacing any previous one with the same name.
    pub fn insert(&mut self, material: MaterialDef) {
        self.materials.insert(material.name.clone(), material);
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialDef) -> Self {
        self.insert(material);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MaterialDef> {
        self.materials.get(name)
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a texture file named in this library.
    #[must_use]
    pub fn resolve(&self, file: &str) -> PathBuf {
        self.base_dir.join(file)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
