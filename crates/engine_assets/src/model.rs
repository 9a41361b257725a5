//! Model-to-components conversion.
//!
//! A model file fans out into one `(Mesh, Material, RenderResource)` part
//! per named geometry group. Loading is all-or-nothing: if any group fails,
//! every texture and buffer created for the model so far is deleted again.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use engine_component::{Material, Mesh, RenderResource, TextureHandle, Vertex};
use engine_graphics::{GpuResourceBinder, GraphicsDevice};
use engine_math::{Vec2, Vec3};

use crate::error::AssetError;
use crate::geometry::{FloatLayout, GeometryDoc, GeometryGroup, MaterialDef, MaterialLib};
use crate::loader::AssetLoader;

/// Shininess used when a material library does not specify one.
pub const DEFAULT_SHININESS: f32 = 32.0;

/// One geometry group with its vertices compacted and its material resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGroup {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Indices into `vertices`.
    pub indices: Vec<u32>,
    pub material: MaterialDef,
}

/// Decode every group of `doc` against `lib`.
///
/// Each group gets only the vertices it references, in first-use order,
/// with its indices remapped accordingly.
///
/// # Errors
///
/// Returns [`AssetError::MaterialNotFound`] if any group's material is not
/// in `lib`; this is checked for all groups before any is decoded. Returns
/// [`AssetError::InvalidLayout`] if the layout or an index range does not
/// fit the coordinate data.
pub fn decode_groups(doc: &GeometryDoc, lib: &MaterialLib) -> Result<Vec<DecodedGroup>, AssetError> {
    let layout = doc.float_layout()?;
    let materials = doc
        .groups
        .iter()
        .map(|group| resolve_material(group, lib))
        .collect::<Result<Vec<_>, _>>()?;

    doc.groups
        .iter()
        .zip(materials)
        .map(|(group, material)| decode_group(doc, layout, group, material))
        .collect()
}

fn resolve_material(group: &GeometryGroup, lib: &MaterialLib) -> Result<MaterialDef, AssetError> {
    group
        .material
        .as_deref()
        .and_then(|name| lib.get(name))
        .cloned()
        .ok_or_else(|| AssetError::MaterialNotFound {
            group: group.name.clone(),
            material: group.material.clone(),
        })
}

fn decode_group(
    doc: &GeometryDoc,
    layout: FloatLayout,
    group: &GeometryGroup,
    material: MaterialDef,
) -> Result<DecodedGroup, AssetError> {
    let end = group.index_begin + group.index_count;
    let Some(source) = doc.indices.get(group.index_begin..end) else {
        return Err(AssetError::InvalidLayout(format!(
            "group `{}` spans indices {}..{end} but only {} exist",
            group.name,
            group.index_begin,
            doc.indices.len()
        )));
    };

    let mut remap = HashMap::with_capacity(source.len());
    let mut vertices = Vec::new();
    let mut indices = Vec::with_capacity(source.len());
    for &index in source {
        let local = match remap.get(&index) {
            Some(&local) => local,
            None => {
                vertices.push(read_vertex(doc, layout, index).ok_or_else(|| {
                    AssetError::InvalidLayout(format!(
                        "group `{}` references vertex {index} but only {} exist",
                        group.name,
                        doc.vertex_count()
                    ))
                })?);
                let local = (vertices.len() - 1) as u32;
                remap.insert(index, local);
                local
            }
        };
        indices.push(local);
    }

    Ok(DecodedGroup {
        name: group.name.clone(),
        vertices,
        indices,
        material,
    })
}

fn read_vertex(doc: &GeometryDoc, layout: FloatLayout, index: u32) -> Option<Vertex> {
    let start = index as usize * layout.stride;
    let v = doc.coords.get(start..start + layout.stride)?;
    let position = Vec3::new(v[0], v[1], v[2]);
    let tex_coords = layout.tex.map_or(Vec2::ZERO, |t| Vec2::new(v[t], v[t + 1]));
    let normal = layout
        .normal
        .map_or(Vec3::ZERO, |n| Vec3::new(v[n], v[n + 1], v[n + 2]));
    Some(Vertex::new(position, tex_coords, normal))
}

/// Load the textures of `def` and build a [`Material`].
///
/// A material without a specular map reuses its diffuse texture.
///
/// # Errors
///
/// Returns [`AssetError::MissingTexture`] if `def` has no diffuse map, and
/// propagates loader and device errors. A diffuse texture created before a
/// failure is deleted again.
pub fn load_material<L, D>(
    loader: &L,
    device: &mut D,
    lib: &MaterialLib,
    def: &MaterialDef,
) -> Result<Material, AssetError>
where
    L: AssetLoader + ?Sized,
    D: GraphicsDevice + ?Sized,
{
    let Some(diffuse_map) = &def.diffuse_map else {
        return Err(AssetError::MissingTexture(def.name.clone()));
    };
    let diffuse = upload_texture(loader, device, &lib.resolve(diffuse_map))?;

    let specular = match &def.specular_map {
        Some(file) => match upload_texture(loader, device, &lib.resolve(file)) {
            Ok(texture) => texture,
            Err(err) => {
                let _ = device.delete_texture(diffuse);
                return Err(err);
            }
        },
        None => diffuse,
    };

    Ok(Material::new(
        diffuse,
        specular,
        def.shininess.unwrap_or(DEFAULT_SHININESS),
    ))
}

fn upload_texture<L, D>(loader: &L, device: &mut D, path: &Path) -> Result<TextureHandle, AssetError>
where
    L: AssetLoader + ?Sized,
    D: GraphicsDevice + ?Sized,
{
    let image = loader.load_texture(path)?;
    Ok(device.create_texture(&image)?)
}

/// One drawable part of a [`Model`].
#[derive(Debug)]
pub struct ModelPart {
    pub name: String,
    pub mesh: Mesh,
    pub material: Material,
    pub resource: RenderResource,
}

/// A fully loaded model: one part per geometry group.
#[derive(Debug, Default)]
pub struct Model {
    pub parts: Vec<ModelPart>,
}

impl Model {
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Every distinct texture referenced by the model's materials.
    #[must_use]
    pub fn textures(&self) -> Vec<TextureHandle> {
        let mut textures = Vec::new();
        for part in &self.parts {
            for texture in [part.material.diffuse, part.material.specular] {
                if !textures.contains(&texture) {
                    textures.push(texture);
                }
            }
        }
        textures
    }

    /// Delete every GPU object owned by the model.
    ///
    /// # Errors
    ///
    /// Returns the first device error; the remaining objects are still
    /// deleted.
    pub fn release<D: GraphicsDevice + ?Sized>(
        self,
        device: &mut D,
        binder: &mut GpuResourceBinder,
    ) -> Result<(), AssetError> {
        let textures = self.textures();
        let mut first_error = None;
        for part in self.parts {
            if let Err(err) = binder.release(device, part.resource) {
                first_error.get_or_insert(err);
            }
        }
        for texture in textures {
            if let Err(err) = device.delete_texture(texture) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Load a model and its material library and upload every group.
///
/// Materials shared by several groups are loaded once.
///
/// # Errors
///
/// Any parse, decode, texture or upload failure aborts the load; whatever
/// was already created on the device is deleted before returning.
pub fn load_model<L, D>(
    loader: &L,
    device: &mut D,
    binder: &mut GpuResourceBinder,
    obj_path: &Path,
    mtl_path: &Path,
) -> Result<Model, AssetError>
where
    L: AssetLoader + ?Sized,
    D: GraphicsDevice + ?Sized,
{
    let doc = loader.parse_geometry(obj_path)?;
    let lib = loader.parse_material_library(mtl_path)?;
    let groups = decode_groups(&doc, &lib)?;

    let mut model = Model::default();
    let mut materials: HashMap<String, Material> = HashMap::new();
    if let Err(err) = build_parts(loader, device, binder, &lib, groups, &mut model, &mut materials) {
        warn!(path = %obj_path.display(), error = %err, "model load failed, rolling back");
        // Materials not yet attached to a part still own textures.
        let attached = model.textures();
        for material in materials.into_values() {
            for texture in [material.diffuse, material.specular] {
                if !attached.contains(&texture) {
                    let _ = device.delete_texture(texture);
                }
            }
        }
        let _ = model.release(device, binder);
        return Err(err);
    }

    info!(path = %obj_path.display(), parts = model.len(), "model loaded");
    Ok(model)
}

fn build_parts<L, D>(
    loader: &L,
    device: &mut D,
    binder: &mut GpuResourceBinder,
    lib: &MaterialLib,
    groups: Vec<DecodedGroup>,
    model: &mut Model,
    materials: &mut HashMap<String, Material>,
) -> Result<(), AssetError>
where
    L: AssetLoader + ?Sized,
    D: GraphicsDevice + ?Sized,
{
    for group in groups {
        let material = match materials.get(&group.material.name) {
            Some(material) => *material,
            None => {
                let material = load_material(loader, device, lib, &group.material)?;
                materials.insert(group.material.name.clone(), material);
                material
            }
        };
        let mesh = Mesh::new(group.vertices, group.indices)?;
        let resource = binder.upload(device, &mesh)?;
        model.parts.push(ModelPart {
            name: group.name,
            mesh,
            material,
            resource,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use engine_graphics::{RecordingDevice, WindowHandle};

    use super::*;
    use crate::obj::ObjAssetLoader;
    use crate::obj::tests::{QUAD_OBJ, write_quad};

    fn quad_coords() -> Vec<f32> {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let mut coords = Vec::new();
        for p in positions {
            Vertex::new(Vec3::from(p), Vec2::new(p[0], p[1]), Vec3::Z).write_interleaved(&mut coords);
        }
        coords
    }

    fn group(name: &str, begin: usize, count: usize, material: &str) -> GeometryGroup {
        GeometryGroup {
            name: name.to_string(),
            index_begin: begin,
            index_count: count,
            material: Some(material.to_string()),
        }
    }

    fn wood_lib() -> MaterialLib {
        MaterialLib::new(".").with_material(MaterialDef::new("wood").with_diffuse_map("wood.png"))
    }

    fn device() -> RecordingDevice {
        let mut device = RecordingDevice::new();
        device.init_context(&WindowHandle::from_raw(1, 800, 600)).unwrap();
        device
    }

    #[test]
    fn test_decode_quad_keeps_indices() {
        let doc = GeometryDoc::interleaved(
            quad_coords(),
            vec![0, 1, 2, 1, 2, 3],
            vec![group("quad", 0, 6, "wood")],
        );
        let groups = decode_groups(&doc, &wood_lib()).unwrap();
        assert_eq!(groups.len(), 1);
        let quad = &groups[0];
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices, vec![0, 1, 2, 1, 2, 3]);
        assert_eq!(quad.indices.len() / 3, 2);
        assert_eq!(quad.vertices[3].position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(quad.material.name, "wood");
    }

    #[test]
    fn test_decode_compacts_each_group() {
        let doc = GeometryDoc::interleaved(
            quad_coords(),
            vec![0, 1, 2, 3, 2, 1],
            vec![group("a", 0, 3, "wood"), group("b", 3, 3, "wood")],
        );
        let groups = decode_groups(&doc, &wood_lib()).unwrap();
        assert_eq!(groups[1].vertices.len(), 3);
        assert_eq!(groups[1].indices, vec![0, 1, 2]);
        assert_eq!(groups[1].vertices[0].position, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_missing_material_fails_whole_decode() {
        let doc = GeometryDoc::interleaved(
            quad_coords(),
            vec![0, 1, 2, 1, 2, 3],
            vec![group("ok", 0, 3, "wood"), group("bad", 3, 3, "missing")],
        );
        let err = decode_groups(&doc, &wood_lib()).unwrap_err();
        match err {
            AssetError::MaterialNotFound { group, material } => {
                assert_eq!(group, "bad");
                assert_eq!(material.as_deref(), Some("missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_group_is_invalid() {
        let doc = GeometryDoc::interleaved(quad_coords(), vec![0, 1, 2], vec![group("q", 0, 6, "wood")]);
        assert!(matches!(
            decode_groups(&doc, &wood_lib()),
            Err(AssetError::InvalidLayout(_))
        ));

        let doc = GeometryDoc::interleaved(quad_coords(), vec![0, 1, 9], vec![group("q", 0, 3, "wood")]);
        assert!(matches!(
            decode_groups(&doc, &wood_lib()),
            Err(AssetError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_load_model_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let (obj_path, mtl_path) = write_quad(dir.path(), QUAD_OBJ);
        let mut device = device();
        let mut binder = GpuResourceBinder::new();

        let model = load_model(&ObjAssetLoader::new(), &mut device, &mut binder, &obj_path, &mtl_path).unwrap();
        assert_eq!(model.len(), 1);
        let part = &model.parts[0];
        assert_eq!(part.mesh.index_count(), 6);
        assert_eq!(part.resource.mesh_id(), part.mesh.id());
        assert_eq!(part.material.shininess, 16.0);
        assert_ne!(part.material.diffuse, part.material.specular);
        assert_eq!(device.live_textures(), 2);
        assert_eq!(device.live_buffers(), 2);

        model.release(&mut device, &mut binder).unwrap();
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
    }

    #[test]
    fn test_load_model_with_separate_material_library() {
        let dir = tempfile::tempdir().unwrap();
        let obj = QUAD_OBJ.replace("mtllib quad.mtl\n", "");
        let (obj_path, mtl_path) = write_quad(dir.path(), &obj);
        let mut device = device();
        let mut binder = GpuResourceBinder::new();

        let model = load_model(&ObjAssetLoader::new(), &mut device, &mut binder, &obj_path, &mtl_path).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.parts[0].material.shininess, 16.0);
        assert_eq!(device.live_textures(), 2);
    }

    #[test]
    fn test_load_model_with_unknown_material() {
        let dir = tempfile::tempdir().unwrap();
        let obj = QUAD_OBJ.replace("usemtl wood", "usemtl missing");
        let (obj_path, mtl_path) = write_quad(dir.path(), &obj);
        let mut device = device();
        let mut binder = GpuResourceBinder::new();

        let err = load_model(&ObjAssetLoader::new(), &mut device, &mut binder, &obj_path, &mtl_path)
            .unwrap_err();
        assert!(matches!(err, AssetError::MaterialNotFound { .. }));
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(binder.uploads(), 0);
    }

    #[test]
    fn test_missing_texture_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (obj_path, mtl_path) = write_quad(dir.path(), QUAD_OBJ);
        fs::remove_file(dir.path().join("textures/specular.png")).unwrap();
        let mut device = device();
        let mut binder = GpuResourceBinder::new();

        let err = load_model(&ObjAssetLoader::new(), &mut device, &mut binder, &obj_path, &mtl_path)
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
    }

    #[test]
    fn test_material_without_specular_reuses_diffuse() {
        let dir = tempfile::tempdir().unwrap();
        write_quad(dir.path(), QUAD_OBJ);
        let lib = MaterialLib::new(dir.path());
        let def = MaterialDef::new("plain").with_diffuse_map("textures/diffuse.png");
        let mut device = device();

        let material = load_material(&ObjAssetLoader::new(), &mut device, &lib, &def).unwrap();
        assert_eq!(material.diffuse, material.specular);
        assert_eq!(material.shininess, DEFAULT_SHININESS);
        assert_eq!(device.live_textures(), 1);

        let err = load_material(&ObjAssetLoader::new(), &mut device, &lib, &MaterialDef::new("bare"))
            .unwrap_err();
        assert!(matches!(err, AssetError::MissingTexture(_)));
    }
}
