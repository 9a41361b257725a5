//! GPU-resident geometry for one mesh.

use crate::handle::{BufferHandle, VertexArrayHandle};
use crate::kinds::mesh::MeshId;

/// Handles to the uploaded vertex and index data of a mesh, plus the index
/// count needed to issue its draw call.
///
/// This type is intentionally not `Clone`: the handles it owns are deleted
/// exactly once, when the value is consumed by [`RenderResource::into_parts`].
#[derive(Debug, PartialEq, Eq)]
pub struct RenderResource {
    mesh: MeshId,
    vertex_array: VertexArrayHandle,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
}

impl RenderResource {
    /// Bundle freshly created handles for the mesh identified by `mesh`.
    #[must_use]
    pub fn new(
        mesh: MeshId,
        vertex_array: VertexArrayHandle,
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
        index_count: u32,
    ) -> Self {
        Self {
            mesh,
            vertex_array,
            vertex_buffer,
            index_buffer,
            index_count,
        }
    }

    /// Identity of the mesh these buffers were built from.
    #[must_use]
    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    #[must_use]
    pub fn vertex_array(&self) -> &VertexArrayHandle {
        &self.vertex_array
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Give up ownership of the handles so they can be deleted.
    #[must_use]
    pub fn into_parts(self) -> (VertexArrayHandle, BufferHandle, BufferHandle) {
        (self.vertex_array, self.vertex_buffer, self.index_buffer)
    }
}
