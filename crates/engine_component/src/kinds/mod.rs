//! Payload types for every [`ComponentKind`](crate::ComponentKind) except
//! `Transform`, which lives in `engine_math`.

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod physics;
pub mod render_resource;

pub use camera::Camera;
pub use light::{AmbientLight, DirectionalLight, PointLight};
pub use material::Material;
pub use mesh::{Mesh, MeshId, Vertex};
pub use physics::Physics;
pub use render_resource::RenderResource;
