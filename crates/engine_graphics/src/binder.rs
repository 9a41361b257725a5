//! GPU resource binder.
//!
//! Turns a [`Mesh`] into a [`RenderResource`] by uploading its vertex and
//! index data, and deletes those GPU objects again once the resource leaves
//! the world. Uploads are memoized on [`MeshId`](engine_component::MeshId):
//! an entity whose render resource was built from its current mesh is not
//! re-uploaded unless the mesh has been explicitly marked dirty.

use tracing::{debug, trace};

use engine_component::{ComponentKind, Entity, Mesh, RenderResource, World};

use crate::device::{BufferData, GraphicsDevice, VERTEX_LAYOUT};
use crate::error::GraphicsError;

/// Uploads meshes and releases render resources on the graphics thread.
#[derive(Debug, Default)]
pub struct GpuResourceBinder {
    uploads: u64,
    releases: u64,
}

impl GpuResourceBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload `mesh` and return the handles as a [`RenderResource`].
    ///
    /// If any step fails, the objects created so far are deleted before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Propagates device errors.
    pub fn upload<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        mesh: &Mesh,
    ) -> Result<RenderResource, GraphicsError> {
        let vertex_array = device.create_vertex_array()?;
        device.bind_vertex_array(Some(&vertex_array));

        let vertex_buffer = match device.create_buffer(BufferData::Vertices(&mesh.interleaved())) {
            Ok(buffer) => buffer,
            Err(err) => {
                device.bind_vertex_array(None);
                let _ = device.delete_vertex_array(vertex_array);
                return Err(err);
            }
        };
        device.set_vertex_layout(&VERTEX_LAYOUT);

        let index_buffer = match device.create_buffer(BufferData::Indices(mesh.indices())) {
            Ok(buffer) => buffer,
            Err(err) => {
                device.bind_vertex_array(None);
                let _ = device.delete_buffer(vertex_buffer);
                let _ = device.delete_vertex_array(vertex_array);
                return Err(err);
            }
        };
        device.bind_vertex_array(None);

        self.uploads += 1;
        debug!(
            mesh = %mesh.id(),
            vertices = mesh.vertices().len(),
            indices = mesh.index_count(),
            "uploaded mesh"
        );

        Ok(RenderResource::new(
            mesh.id(),
            vertex_array,
            vertex_buffer,
            index_buffer,
            mesh.index_count() as u32,
        ))
    }

    /// Make sure `entity`'s render resource reflects its mesh.
    ///
    /// Returns `Ok(true)` if an upload happened. Entities without a mesh are
    /// left alone. A superseded render resource is queued for release.
    ///
    /// # Errors
    ///
    /// Propagates device errors.
    pub fn ensure_uploaded<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        world: &mut World,
        entity: Entity,
    ) -> Result<bool, GraphicsError> {
        let Some(mesh) = world.get::<Mesh>(entity) else {
            return Ok(false);
        };
        let up_to_date = world
            .get::<RenderResource>(entity)
            .is_some_and(|resource| resource.mesh_id() == mesh.id());
        if up_to_date && !mesh.is_dirty() {
            return Ok(false);
        }

        let resource = self.upload(device, mesh)?;
        if let Some(mesh) = world.get_mut::<Mesh>(entity) {
            mesh.clear_dirty();
        }
        world.remove_component(entity, ComponentKind::RenderResource);
        world.add_component(entity, resource)?;
        Ok(true)
    }

    /// Delete the GPU objects owned by `resource`.
    ///
    /// All three deletions are attempted; the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::UnknownHandle`] if the device no longer knows
    /// one of the handles.
    pub fn release<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        resource: RenderResource,
    ) -> Result<(), GraphicsError> {
        let mesh = resource.mesh_id();
        let (vertex_array, vertex_buffer, index_buffer) = resource.into_parts();
        let results = [
            device.delete_vertex_array(vertex_array),
            device.delete_buffer(vertex_buffer),
            device.delete_buffer(index_buffer),
        ];
        self.releases += 1;
        trace!(%mesh, "released render resource");
        results.into_iter().collect()
    }

    /// Release every render resource the world has let go of.
    ///
    /// # Errors
    ///
    /// Returns the first release failure; the remaining resources are still
    /// released.
    pub fn release_pending<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        world: &mut World,
    ) -> Result<usize, GraphicsError> {
        let pending = world.store_mut().drain_released();
        let count = pending.len();
        let mut first_error = None;
        for resource in pending {
            if let Err(err) = self.release(device, resource) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(count),
        }
    }

    /// Number of mesh uploads performed.
    #[must_use]
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Number of render resources released.
    #[must_use]
    pub fn releases(&self) -> u64 {
        self.releases
    }
}
