//! Triangle mesh component and built-in primitives.

use engine_math::{Vec2, Vec3};
use uuid::Uuid;

use crate::error::ComponentError;

/// Stable identity of a mesh's geometry.
///
/// The GPU resource binder uses this as its memoization key: geometry with
/// the same id is never uploaded twice unless the mesh is marked dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(Uuid);

impl MeshId {
    /// Generate a fresh, globally unique mesh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeshId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mesh({})", self.0)
    }
}

/// A single vertex: position, texture coordinate and normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub tex_coords: Vec2,
    pub normal: Vec3,
}

impl Vertex {
    /// Floats per interleaved vertex (3 position + 2 texcoord + 3 normal).
    pub const FLOATS: usize = 8;
    /// Interleaved stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * std::mem::size_of::<f32>();
    /// Byte offset of the texture coordinate within a vertex.
    pub const TEX_COORDS_OFFSET: usize = 3 * std::mem::size_of::<f32>();
    /// Byte offset of the normal within a vertex.
    pub const NORMAL_OFFSET: usize = 5 * std::mem::size_of::<f32>();

    #[must_use]
    pub const fn new(position: Vec3, tex_coords: Vec2, normal: Vec3) -> Self {
        Self {
            position,
            tex_coords,
            normal,
        }
    }

    /// Append this vertex to `out` in interleaved layout.
    pub fn write_interleaved(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.position.to_array());
        out.extend_from_slice(&self.tex_coords.to_array());
        out.extend_from_slice(&self.normal.to_array());
    }
}

/// Indexed triangle-list geometry.
///
/// Cloning a mesh keeps its [`MeshId`]; use [`Mesh::new`] to build
/// independent geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: MeshId,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    dirty: bool,
}

impl Mesh {
    /// Build a mesh, checking every index against the vertex list.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::IndexOutOfBounds`] if any index references a
    /// vertex that does not exist.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, ComponentError> {
        validate_indices(&vertices, &indices)?;
        Ok(Self {
            id: MeshId::new(),
            vertices,
            indices,
            dirty: false,
        })
    }

    #[must_use]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Replace the geometry in place and mark the mesh dirty.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::IndexOutOfBounds`] and leaves the mesh
    /// untouched if the new indices are invalid.
    pub fn set_geometry(
        &mut self,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Result<(), ComponentError> {
        validate_indices(&vertices, &indices)?;
        self.vertices = vertices;
        self.indices = indices;
        self.dirty = true;
        Ok(())
    }

    /// Request a re-upload on the next bind.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the binder once the current geometry is on the GPU.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Vertex data in interleaved position/texcoord/normal layout.
    #[must_use]
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertices.len() * Vertex::FLOATS);
        for vertex in &self.vertices {
            vertex.write_interleaved(&mut out);
        }
        out
    }

    /// A unit cube centred on the origin, 24 vertices with per-face normals.
    #[must_use]
    pub fn cube() -> Self {
        // (normal, u, v) with u × v = normal so faces wind counter-clockwise.
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            let base = vertices.len() as u32;
            for (su, sv) in CORNERS {
                let position = (normal + u * su + v * sv) * 0.5;
                let tex_coords = Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5);
                vertices.push(Vertex::new(position, tex_coords, normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            id: MeshId::new(),
            vertices,
            indices,
            dirty: false,
        }
    }

    /// A square in the XZ plane facing +Y, `size` units on a side.
    #[must_use]
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vertex::new(Vec3::new(-h, 0.0, h), Vec2::new(0.0, 0.0), Vec3::Y),
            Vertex::new(Vec3::new(h, 0.0, h), Vec2::new(1.0, 0.0), Vec3::Y),
            Vertex::new(Vec3::new(h, 0.0, -h), Vec2::new(1.0, 1.0), Vec3::Y),
            Vertex::new(Vec3::new(-h, 0.0, -h), Vec2::new(0.0, 1.0), Vec3::Y),
        ];
        Self {
            id: MeshId::new(),
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            dirty: false,
        }
    }
}

fn validate_indices(vertices: &[Vertex], indices: &[u32]) -> Result<(), ComponentError> {
    match indices.iter().find(|&&i| i as usize >= vertices.len()) {
        Some(&index) => Err(ComponentError::IndexOutOfBounds {
            index,
            vertex_count: vertices.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<Vertex> {
        [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
            .into_iter()
            .map(|(x, y)| Vertex::new(Vec3::new(x, y, 0.0), Vec2::ZERO, Vec3::Z))
            .collect()
    }

    #[test]
    fn test_new_rejects_out_of_range_index() {
        let err = Mesh::new(quad_vertices(), vec![0, 1, 4]).unwrap_err();
        assert_eq!(
            err,
            ComponentError::IndexOutOfBounds {
                index: 4,
                vertex_count: 4
            }
        );
    }

    #[test]
    fn test_each_mesh_gets_its_own_id() {
        let a = Mesh::new(quad_vertices(), vec![0, 1, 2]).unwrap();
        let b = Mesh::new(quad_vertices(), vec![0, 1, 2]).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_interleaved_layout() {
        let mesh = Mesh::new(quad_vertices(), vec![0, 1, 2, 1, 2, 3]).unwrap();
        let data = mesh.interleaved();
        assert_eq!(data.len(), 4 * Vertex::FLOATS);
        // Second vertex position starts one stride in.
        assert_eq!(&data[8..11], &[1.0, 0.0, 0.0]);
        // Normal of the first vertex sits at the normal offset.
        assert_eq!(&data[5..8], &[0.0, 0.0, 1.0]);
        assert_eq!(Vertex::STRIDE_BYTES, 32);
        assert_eq!(Vertex::NORMAL_OFFSET, 20);
    }

    #[test]
    fn test_set_geometry_marks_dirty() {
        let mut mesh = Mesh::new(quad_vertices(), vec![0, 1, 2]).unwrap();
        assert!(!mesh.is_dirty());
        mesh.set_geometry(quad_vertices(), vec![1, 2, 3]).unwrap();
        assert!(mesh.is_dirty());
        mesh.clear_dirty();
        assert!(mesh.set_geometry(quad_vertices(), vec![9]).is_err());
        assert!(!mesh.is_dirty());
        assert_eq!(mesh.indices(), &[1, 2, 3]);
    }

    #[test]
    fn test_cube_shape() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices().len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube
            .vertices()
            .iter()
            .all(|v| v.position.abs().max_element() == 0.5));
    }

    #[test]
    fn test_cube_faces_wind_outwards() {
        let cube = Mesh::cube();
        for tri in cube.indices().chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cube.vertices()[i as usize]);
            let face_normal = (b.position - a.position).cross(c.position - a.position);
            assert!(face_normal.dot(a.normal) > 0.0);
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let plane = Mesh::plane(10.0);
        let v = plane.vertices();
        let n = (v[1].position - v[0].position).cross(v[2].position - v[0].position);
        assert!(n.y > 0.0);
    }
}
