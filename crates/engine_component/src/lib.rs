//! # engine_component
//!
//! The "E" and "C" of the engine's ECS: entity identity, the closed set of
//! component kinds, and the store that maps `(entity, kind)` to component
//! data.
//!
//! This crate provides:
//!
//! - [`Entity`] / [`EntityRegistry`] — monotonically allocated identifiers and
//!   the live set, in creation order.
//! - [`Component`] / [`ComponentKind`] — a tagged union with one variant per
//!   kind, plus [`ComponentData`] for typed access.
//! - [`ComponentStore`] — O(1) storage keyed by `(Entity, ComponentKind)`.
//! - [`World`] — registry and store kept consistent across destruction.
//! - [`kinds`] — component payloads and their factories.
//! - [`handle`] — opaque GPU handles carried by components.

pub mod component;
pub mod entity;
pub mod error;
pub mod handle;
pub mod kinds;
pub mod store;
pub mod world;

pub use component::{Component, ComponentData, ComponentKind};
pub use entity::{Entity, EntityAllocator, EntityRegistry};
pub use error::ComponentError;
pub use handle::{BufferHandle, ProgramHandle, TextureHandle, VertexArrayHandle};
pub use kinds::{
    AmbientLight, Camera, DirectionalLight, Material, Mesh, MeshId, Physics, PointLight,
    RenderResource, Vertex,
};
pub use store::{ComponentStore, DuplicatePolicy};
pub use world::World;

pub use engine_math::Transform;
