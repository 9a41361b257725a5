//! The render system.
//!
//! Owns the shader program and the [`GpuResourceBinder`]. Each
//! [`RenderSystem::update`] releases GPU objects the world has dropped,
//! uploads meshes that need it, then issues one indexed draw per entity that
//! has a render resource.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use engine_component::{Camera, ComponentKind, ProgramHandle, RenderResource, Transform, World};
use engine_graphics::{GpuResourceBinder, GraphicsDevice, GraphicsError, IndexType, PrimitiveKind};
use engine_math::Mat4;

use crate::error::RenderError;
use crate::shaders::{
    DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER, MODEL_UNIFORM, PROJECTION_UNIFORM, VIEW_UNIFORM,
};

/// Dark blue.
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.4, 0.0];

/// Render settings, usually read from the engine config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    /// Vertex shader file; the built-in shader is used when unset.
    pub vertex_shader: Option<PathBuf>,
    /// Fragment shader file; the built-in shader is used when unset.
    pub fragment_shader: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: DEFAULT_CLEAR_COLOR,
            vertex_shader: None,
            fragment_shader: None,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    #[must_use]
    pub fn with_shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = Some(vertex.into());
        self.fragment_shader = Some(fragment.into());
        self
    }
}

fn shader_source(path: Option<&Path>, builtin: &str) -> Result<String, RenderError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| RenderError::ShaderSource {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(builtin.to_string()),
    }
}

/// What one frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    /// Meshes uploaded this frame.
    pub uploads: u32,
    /// Render resources released this frame.
    pub released: usize,
}

#[derive(Debug)]
pub struct RenderSystem {
    program: Option<ProgramHandle>,
    binder: GpuResourceBinder,
    clear_color: [f32; 4],
    frames: u64,
}

impl RenderSystem {
    /// Compile the shader program on `device`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::NoContext`] if the device has no context,
    /// [`RenderError::ShaderSource`] if a configured shader file is
    /// unreadable, or the device's compile error.
    pub fn new<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        config: &RenderConfig,
    ) -> Result<Self, RenderError> {
        if !device.has_context() {
            return Err(GraphicsError::NoContext.into());
        }
        let vertex = shader_source(config.vertex_shader.as_deref(), DEFAULT_VERTEX_SHADER)?;
        let fragment = shader_source(config.fragment_shader.as_deref(), DEFAULT_FRAGMENT_SHADER)?;
        let program = device.compile_program(&vertex, &fragment)?;
        info!(program = program.raw(), "render system ready");

        Ok(Self {
            program: Some(program),
            binder: GpuResourceBinder::new(),
            clear_color: config.clear_color,
            frames: 0,
        })
    }

    /// Render one frame of `world`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Destroyed`] after [`RenderSystem::destroy`],
    /// or a device error from releasing or uploading resources.
    pub fn update<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        world: &mut World,
    ) -> Result<FrameStats, RenderError> {
        let Some(program) = &self.program else {
            return Err(RenderError::Destroyed);
        };
        let mut stats = FrameStats {
            released: self.binder.release_pending(device, world)?,
            ..FrameStats::default()
        };

        device.clear(self.clear_color);
        device.use_program(program);

        if let Some((_, camera)) = world.first_with::<Camera>() {
            device.set_uniform_mat4(program, VIEW_UNIFORM, &camera.view_matrix());
            device.set_uniform_mat4(program, PROJECTION_UNIFORM, &camera.projection_matrix());
        }

        let snapshot = world.active_entities().to_vec();
        for entity in snapshot {
            if self.binder.ensure_uploaded(device, world, entity)? {
                stats.uploads += 1;
            }
            let Some(resource) = world.get::<RenderResource>(entity) else {
                continue;
            };
            let model = world
                .get::<Transform>(entity)
                .map_or(Mat4::IDENTITY, Transform::to_matrix);

            device.set_uniform_mat4(program, MODEL_UNIFORM, &model);
            device.bind_vertex_array(Some(resource.vertex_array()));
            device.draw_elements(PrimitiveKind::Triangles, resource.index_count(), IndexType::U32);
            device.bind_vertex_array(None);
            stats.draw_calls += 1;
        }

        self.frames += 1;
        trace!(
            frame = self.frames,
            draw_calls = stats.draw_calls,
            uploads = stats.uploads,
            released = stats.released,
            "frame rendered"
        );
        Ok(stats)
    }

    /// Release every render resource in `world` and delete the program.
    ///
    /// Calling this more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first device error; everything else is still released.
    pub fn destroy<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        world: &mut World,
    ) -> Result<(), RenderError> {
        let Some(program) = self.program.take() else {
            return Ok(());
        };
        world.store_mut().remove_kind(ComponentKind::RenderResource);
        let released = self.binder.release_pending(device, world);
        let deleted = device.delete_program(program);
        debug!(frames = self.frames, "render system destroyed");
        released?;
        deleted?;
        Ok(())
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.program.is_none()
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn binder(&self) -> &GpuResourceBinder {
        &self.binder
    }

    /// Mutable access for loading models with the same binder.
    pub fn binder_mut(&mut self) -> &mut GpuResourceBinder {
        &mut self.binder
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Entity, Mesh};
    use engine_graphics::{GpuCommand, RecordingDevice, WindowHandle};
    use engine_math::Vec3;

    use super::*;

    fn device() -> RecordingDevice {
        let mut device = RecordingDevice::new();
        device.init_context(&WindowHandle::from_raw(1, 800, 600)).unwrap();
        device
    }

    fn system(device: &mut RecordingDevice) -> RenderSystem {
        RenderSystem::new(device, &RenderConfig::default()).unwrap()
    }

    fn cube_at(world: &mut World, x: f32) -> Entity {
        let e = world.spawn();
        world.add_component(e, Transform::from_position(Vec3::new(x, 0.0, 0.0))).unwrap();
        world.add_component(e, Mesh::cube()).unwrap();
        e
    }

    #[test]
    fn test_empty_world_still_clears() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        device.take_commands();

        let stats = render.update(&mut device, &mut world).unwrap();
        assert_eq!(stats, FrameStats::default());
        let commands = device.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], GpuCommand::Clear(DEFAULT_CLEAR_COLOR));
        assert!(matches!(commands[1], GpuCommand::UseProgram(_)));
        assert_eq!(device.draw_calls(), 0);
    }

    #[test]
    fn test_draws_every_mesh_entity_once() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        cube_at(&mut world, 0.0);
        cube_at(&mut world, 2.0);
        let bare = world.spawn();
        world.add_component(bare, Transform::IDENTITY).unwrap();

        let stats = render.update(&mut device, &mut world).unwrap();
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.uploads, 2);
        assert!(device.commands().contains(&GpuCommand::DrawElements {
            primitive: PrimitiveKind::Triangles,
            count: 36,
            index_type: IndexType::U32,
        }));
    }

    #[test]
    fn test_second_frame_does_not_reupload() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        cube_at(&mut world, 0.0);

        render.update(&mut device, &mut world).unwrap();
        let stats = render.update(&mut device, &mut world).unwrap();
        assert_eq!(stats.uploads, 0);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(render.binder().uploads(), 1);
        assert_eq!(render.frames(), 2);
    }

    #[test]
    fn test_model_matrix_follows_transform() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        cube_at(&mut world, 3.0);

        render.update(&mut device, &mut world).unwrap();
        let expected = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        assert!(device.commands().contains(&GpuCommand::SetUniformMat4 {
            name: MODEL_UNIFORM.to_string(),
            value: expected,
        }));
    }

    #[test]
    fn test_first_camera_sets_view_and_projection() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        let first = Camera::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Y, -90.0, 0.0, 45.0, 4.0 / 3.0, 0.1, 100.0);
        let second = Camera::new(Vec3::new(9.0, 9.0, 9.0), Vec3::Y, 0.0, 0.0, 30.0, 1.0, 0.1, 10.0);
        let a = world.spawn();
        world.add_component(a, first).unwrap();
        let b = world.spawn();
        world.add_component(b, second).unwrap();

        render.update(&mut device, &mut world).unwrap();
        let views: Vec<_> = device
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetUniformMat4 { name, value } if name == VIEW_UNIFORM => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(views, vec![first.view_matrix()]);
    }

    #[test]
    fn test_destroyed_entity_is_released_next_frame() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        let e = cube_at(&mut world, 0.0);
        cube_at(&mut world, 1.0);
        render.update(&mut device, &mut world).unwrap();

        world.destroy_entity(e);
        let stats = render.update(&mut device, &mut world).unwrap();
        assert_eq!(stats.released, 1);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(device.live_vertex_arrays(), 1);
        assert_eq!(device.live_buffers(), 2);
    }

    #[test]
    fn test_destroy_releases_everything_once() {
        let mut device = device();
        let mut render = system(&mut device);
        let mut world = World::new();
        cube_at(&mut world, 0.0);
        render.update(&mut device, &mut world).unwrap();

        render.destroy(&mut device, &mut world).unwrap();
        render.destroy(&mut device, &mut world).unwrap();
        assert!(render.is_destroyed());
        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.live_buffers(), 0);
        assert!(matches!(
            render.update(&mut device, &mut world),
            Err(RenderError::Destroyed)
        ));
    }

    #[test]
    fn test_requires_context_and_valid_shaders() {
        let mut device = RecordingDevice::new();
        assert!(matches!(
            RenderSystem::new(&mut device, &RenderConfig::default()),
            Err(RenderError::Graphics(GraphicsError::NoContext))
        ));

        let mut device = RecordingDevice::new().with_compile_failure("syntax error");
        device.init_context(&WindowHandle::from_raw(1, 1, 1)).unwrap();
        assert!(matches!(
            RenderSystem::new(&mut device, &RenderConfig::default()),
            Err(RenderError::Graphics(GraphicsError::ShaderCompile(_)))
        ));
    }

    #[test]
    fn test_shader_files_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let vertex = dir.path().join("vertex.glsl");
        let fragment = dir.path().join("fragment.glsl");
        std::fs::write(&vertex, DEFAULT_VERTEX_SHADER).unwrap();
        std::fs::write(&fragment, DEFAULT_FRAGMENT_SHADER).unwrap();

        let mut device = device();
        let config = RenderConfig::default().with_shaders(&vertex, &fragment);
        assert!(RenderSystem::new(&mut device, &config).is_ok());

        let config = RenderConfig::default().with_shaders(&vertex, dir.path().join("nope.glsl"));
        assert!(matches!(
            RenderSystem::new(&mut device, &config),
            Err(RenderError::ShaderSource { .. })
        ));
    }

    #[test]
    fn test_render_config_from_json() {
        let config: RenderConfig = serde_json::from_str(r#"{ "clear_color": [1.0, 0.0, 0.0, 1.0] }"#).unwrap();
        assert_eq!(config.clear_color, [1.0, 0.0, 0.0, 1.0]);
        assert!(config.vertex_shader.is_none());
    }
}
