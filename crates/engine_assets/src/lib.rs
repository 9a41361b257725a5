//! # engine_assets
//!
//! Turns model and material files into engine components.
//!
//! - [`AssetLoader`] — the parsing seam, producing [`GeometryDoc`] and
//!   [`MaterialLib`] documents and RGBA textures.
//! - [`ObjAssetLoader`] — Wavefront OBJ/MTL via `tobj`, textures via `image`.
//! - [`decode_groups`] / [`load_material`] / [`load_model`] — document to
//!   `(Mesh, Material, RenderResource)` conversion, all-or-nothing.

pub mod error;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod obj;

pub use error::AssetError;
pub use geometry::{GeometryDoc, GeometryGroup, MaterialDef, MaterialLib};
pub use loader::AssetLoader;
pub use model::{DecodedGroup, Model, ModelPart, decode_groups, load_material, load_model};
pub use obj::ObjAssetLoader;
