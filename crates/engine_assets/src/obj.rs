//! Wavefront OBJ/MTL loader backed by `tobj`, with textures decoded by `image`.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use tracing::debug;

use engine_component::Vertex;
use engine_graphics::TextureImage;

use crate::error::AssetError;
use crate::geometry::{GeometryDoc, GeometryGroup, MaterialDef, MaterialLib};
use crate::loader::AssetLoader;

/// File-backed [`AssetLoader`] for `.obj` / `.mtl` files.
///
/// Every OBJ object or group becomes one [`GeometryGroup`]. All groups share
/// a single coordinate buffer in the engine's [`Vertex`] layout; attributes
/// missing from the file are zero-filled.
///
/// Group material names come from the `usemtl` statements themselves. Any
/// `mtllib` reference inside the geometry file is ignored; materials are
/// resolved later against the library passed to the model loader.
#[derive(Debug, Clone)]
pub struct ObjAssetLoader {
    triangulate: bool,
}

impl ObjAssetLoader {
    #[must_use]
    pub fn new() -> Self {
        Self { triangulate: true }
    }

    /// Whether polygons with more than three vertices are split into triangles.
    #[must_use]
    pub fn with_triangulate(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }
}

impl Default for ObjAssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_error(path: &Path, err: tobj::LoadError) -> AssetError {
    match err {
        tobj::LoadError::OpenFileFailed => AssetError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "could not open file"),
        },
        other => AssetError::Parse {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// Placeholder library name handed to `tobj` in place of the file's own `mtllib`.
const MATERIAL_TABLE: &str = "materials.mtl";

/// Rewrite `source` so every `usemtl` name maps to an entry of a synthetic
/// material table, independent of whichever `mtllib` the file names.
///
/// Returns the rewritten source and the table as MTL text.
fn material_table(source: &str) -> (String, String) {
    let mut names: Vec<&str> = Vec::new();
    let mut body = String::with_capacity(source.len());
    for line in source.lines() {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("mtllib") => continue,
            Some("usemtl") => {
                let name = line.trim().split_once(' ').unwrap_or_default().1.trim();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
            _ => {}
        }
        body.push_str(line);
        body.push('\n');
    }

    if names.is_empty() {
        return (body, String::new());
    }
    let table = names.iter().map(|name| format!("newmtl {name}\n")).collect();
    (format!("mtllib {MATERIAL_TABLE}\n{body}"), table)
}

impl AssetLoader for ObjAssetLoader {
    fn parse_geometry(&self, path: &Path) -> Result<GeometryDoc, AssetError> {
        let options = tobj::LoadOptions {
            triangulate: self.triangulate,
            single_index: true,
            ..Default::default()
        };
        let source = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (source, table) = material_table(&source);
        let (models, materials) = tobj::load_obj_buf(&mut Cursor::new(source), &options, |_| {
            tobj::load_mtl_buf(&mut Cursor::new(table.as_bytes()))
        })
        .map_err(|err| parse_error(path, err))?;
        let materials = materials.map_err(|err| parse_error(path, err))?;

        let mut coords = Vec::new();
        let mut indices = Vec::new();
        let mut groups = Vec::with_capacity(models.len());
        let mut has_texcoords = false;
        let mut has_normals = false;

        for model in &models {
            let mesh = &model.mesh;
            let base = (coords.len() / Vertex::FLOATS) as u32;
            let vertex_count = mesh.positions.len() / 3;
            has_texcoords |= !mesh.texcoords.is_empty();
            has_normals |= !mesh.normals.is_empty();

            for i in 0..vertex_count {
                coords.extend_from_slice(&mesh.positions[i * 3..i * 3 + 3]);
                match mesh.texcoords.get(i * 2..i * 2 + 2) {
                    Some(uv) => coords.extend_from_slice(uv),
                    None => coords.extend_from_slice(&[0.0; 2]),
                }
                match mesh.normals.get(i * 3..i * 3 + 3) {
                    Some(normal) => coords.extend_from_slice(normal),
                    None => coords.extend_from_slice(&[0.0; 3]),
                }
            }

            let material = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(|material| material.name.clone());
            if material.is_none() {
                debug!(group = %model.name, "group has no resolvable material");
            }

            groups.push(GeometryGroup {
                name: model.name.clone(),
                index_begin: indices.len(),
                index_count: mesh.indices.len(),
                material,
            });
            indices.extend(mesh.indices.iter().map(|&index| base + index));
        }

        debug!(
            path = %path.display(),
            groups = groups.len(),
            vertices = coords.len() / Vertex::FLOATS,
            indices = indices.len(),
            "parsed geometry"
        );

        Ok(GeometryDoc {
            coords,
            indices,
            stride_bytes: Vertex::STRIDE_BYTES,
            tex_offset_bytes: Vertex::TEX_COORDS_OFFSET,
            normal_offset_bytes: Vertex::NORMAL_OFFSET,
            has_texcoords,
            has_normals,
            groups,
        })
    }

    fn parse_material_library(&self, path: &Path) -> Result<MaterialLib, AssetError> {
        let (materials, _) = tobj::load_mtl(path).map_err(|err| parse_error(path, err))?;
        let base_dir = path.parent().unwrap_or(Path::new("."));

        let mut lib = MaterialLib::new(base_dir);
        for material in materials {
            lib.insert(MaterialDef {
                name: material.name,
                diffuse_map: material.diffuse_texture,
                specular_map: material.specular_texture,
                shininess: material.shininess,
            });
        }
        debug!(path = %path.display(), materials = lib.len(), "parsed material library");
        Ok(lib)
    }

    fn load_texture(&self, path: &Path) -> Result<TextureImage, AssetError> {
        let image = image::open(path).map_err(|err| match err {
            image::ImageError::IoError(source) => AssetError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => AssetError::Texture {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(TextureImage {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    pub(crate) const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0 0
vt 1 0
vt 0 1
vt 1 1
vn 0 0 1
usemtl wood
f 1/1/1 2/2/1 3/3/1
f 2/2/1 4/4/1 3/3/1
";

    pub(crate) const QUAD_MTL: &str = "\
newmtl wood
Ns 16.0
map_Kd textures/diffuse.png
map_Ks textures/specular.png
";

    /// Write `quad.obj`, `quad.mtl` and two 2x2 textures into `dir`.
    pub(crate) fn write_quad(dir: &Path, obj: &str) -> (PathBuf, PathBuf) {
        let obj_path = dir.join("quad.obj");
        let mtl_path = dir.join("quad.mtl");
        fs::write(&obj_path, obj).unwrap();
        fs::write(&mtl_path, QUAD_MTL).unwrap();
        fs::create_dir_all(dir.join("textures")).unwrap();
        for name in ["diffuse.png", "specular.png"] {
            image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]))
                .save(dir.join("textures").join(name))
                .unwrap();
        }
        (obj_path, mtl_path)
    }

    #[test]
    fn test_parse_quad_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let (obj_path, _) = write_quad(dir.path(), QUAD_OBJ);

        let doc = ObjAssetLoader::new().parse_geometry(&obj_path).unwrap();
        assert_eq!(doc.vertex_count(), 4);
        assert_eq!(doc.indices.len(), 6);
        assert!(doc.has_texcoords);
        assert!(doc.has_normals);
        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.groups[0].name, "quad");
        assert_eq!(doc.groups[0].material.as_deref(), Some("wood"));
    }

    #[test]
    fn test_group_material_without_mtllib() {
        let dir = tempfile::tempdir().unwrap();
        let obj = QUAD_OBJ.replace("mtllib quad.mtl\n", "");
        let (obj_path, _) = write_quad(dir.path(), &obj);

        let doc = ObjAssetLoader::new().parse_geometry(&obj_path).unwrap();
        assert_eq!(doc.groups[0].material.as_deref(), Some("wood"));
    }

    #[test]
    fn test_group_material_with_missing_mtllib() {
        let dir = tempfile::tempdir().unwrap();
        let obj = QUAD_OBJ.replace("mtllib quad.mtl", "mtllib elsewhere.mtl");
        let (obj_path, _) = write_quad(dir.path(), &obj);

        let doc = ObjAssetLoader::new().parse_geometry(&obj_path).unwrap();
        assert_eq!(doc.groups[0].material.as_deref(), Some("wood"));
    }

    #[test]
    fn test_material_table_keeps_first_use_order() {
        let (body, table) =
            material_table("mtllib a.mtl\no one\nusemtl metal\no two\nusemtl wood\nusemtl metal\n");
        assert!(body.starts_with("mtllib materials.mtl\n"));
        assert!(!body.contains("a.mtl"));
        assert_eq!(table, "newmtl metal\nnewmtl wood\n");
    }

    #[test]
    fn test_material_table_without_materials() {
        let (body, table) = material_table("o plain\nv 0 0 0\n");
        assert_eq!(body, "o plain\nv 0 0 0\n");
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_material_library() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mtl_path) = write_quad(dir.path(), QUAD_OBJ);

        let lib = ObjAssetLoader::new().parse_material_library(&mtl_path).unwrap();
        let wood = lib.get("wood").unwrap();
        assert_eq!(wood.diffuse_map.as_deref(), Some("textures/diffuse.png"));
        assert_eq!(wood.shininess, Some(16.0));
        assert_eq!(lib.base_dir(), dir.path());
    }

    #[test]
    fn test_missing_geometry_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ObjAssetLoader::new()
            .parse_geometry(&dir.path().join("nope.obj"))
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_load_texture_rgba() {
        let dir = tempfile::tempdir().unwrap();
        write_quad(dir.path(), QUAD_OBJ);
        let texture = ObjAssetLoader::new()
            .load_texture(&dir.path().join("textures/diffuse.png"))
            .unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(texture.pixels.len(), 16);
        assert_eq!(&texture.pixels[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn test_malformed_texture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();
        let err = ObjAssetLoader::new().load_texture(&path).unwrap_err();
        assert!(matches!(err, AssetError::Texture { .. }));
    }
}
