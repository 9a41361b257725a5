//! Headless backends.
//!
//! [`HeadlessWindowing`] replays scripted input and never opens a real
//! window. [`RecordingDevice`] records every command it receives and tracks
//! which handles are live, so callers can assert on the exact command stream
//! and catch double deletes. Together they run the engine without a GPU.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use engine_component::{BufferHandle, ProgramHandle, TextureHandle, VertexArrayHandle};
use engine_math::Mat4;

use crate::device::{BufferData, GraphicsDevice, IndexType, PrimitiveKind, TextureImage, VertexAttribute};
use crate::error::{GraphicsError, WindowError};
use crate::window::{InputEvent, WindowConfig, WindowHandle, Windowing};

/// Which buffer target a recorded buffer was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    InitContext { window: u32 },
    CompileProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    SetUniformMat4 { name: String, value: Mat4 },
    Clear([f32; 4]),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    CreateBuffer { id: u32, target: BufferTarget, bytes: usize },
    SetVertexLayout(Vec<VertexAttribute>),
    DeleteVertexArray(u32),
    DeleteBuffer(u32),
    CreateTexture { id: u32, width: u32, height: u32 },
    DeleteTexture(u32),
    DrawElements { primitive: PrimitiveKind, count: u32, index_type: IndexType },
}

/// A [`GraphicsDevice`] that records commands instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<GpuCommand>,
    next_id: u32,
    context: bool,
    fail_context: Option<String>,
    fail_compile: Option<String>,
    programs: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    buffers: HashSet<u32>,
    textures: HashSet<u32>,
}

impl RecordingDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`GraphicsDevice::init_context`] fail with `reason`.
    #[must_use]
    pub fn with_context_failure(mut self, reason: impl Into<String>) -> Self {
        self.fail_context = Some(reason.into());
        self
    }

    /// Make [`GraphicsDevice::compile_program`] fail with `log`.
    #[must_use]
    pub fn with_compile_failure(mut self, log: impl Into<String>) -> Self {
        self.fail_compile = Some(log.into());
        self
    }

    /// Every command recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of draw calls recorded so far.
    #[must_use]
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::DrawElements { .. }))
            .count()
    }

    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn allocate(&mut self) -> Result<u32, GraphicsError> {
        if !self.context {
            return Err(GraphicsError::NoContext);
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn forget(set: &mut HashSet<u32>, kind: &'static str, raw: u32) -> Result<(), GraphicsError> {
        if set.remove(&raw) {
            Ok(())
        } else {
            Err(GraphicsError::UnknownHandle { kind, raw })
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn init_context(&mut self, window: &WindowHandle) -> Result<(), GraphicsError> {
        if let Some(reason) = &self.fail_context {
            return Err(GraphicsError::Context(reason.clone()));
        }
        self.context = true;
        self.commands.push(GpuCommand::InitContext { window: window.raw() });
        Ok(())
    }

    fn has_context(&self) -> bool {
        self.context
    }

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, GraphicsError> {
        if !self.context {
            return Err(GraphicsError::NoContext);
        }
        if let Some(log) = &self.fail_compile {
            return Err(GraphicsError::ShaderCompile(log.clone()));
        }
        if vertex_source.trim().is_empty() || fragment_source.trim().is_empty() {
            return Err(GraphicsError::ShaderCompile("empty shader source".to_string()));
        }
        let id = self.allocate()?;
        self.programs.insert(id);
        self.commands.push(GpuCommand::CompileProgram(id));
        Ok(ProgramHandle::from_raw(id))
    }

    fn use_program(&mut self, program: &ProgramHandle) {
        self.commands.push(GpuCommand::UseProgram(program.raw()));
    }

    fn delete_program(&mut self, program: ProgramHandle) -> Result<(), GraphicsError> {
        Self::forget(&mut self.programs, "program", program.raw())?;
        self.commands.push(GpuCommand::DeleteProgram(program.raw()));
        Ok(())
    }

    fn set_uniform_mat4(&mut self, _program: &ProgramHandle, name: &str, value: &Mat4) {
        self.commands.push(GpuCommand::SetUniformMat4 {
            name: name.to_string(),
            value: *value,
        });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(GpuCommand::Clear(color));
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, GraphicsError> {
        let id = self.allocate()?;
        self.vertex_arrays.insert(id);
        self.commands.push(GpuCommand::CreateVertexArray(id));
        Ok(VertexArrayHandle::from_raw(id))
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<&VertexArrayHandle>) {
        self.commands
            .push(GpuCommand::BindVertexArray(vertex_array.map(VertexArrayHandle::raw)));
    }

    fn create_buffer(&mut self, data: BufferData<'_>) -> Result<BufferHandle, GraphicsError> {
        let id = self.allocate()?;
        let target = match data {
            BufferData::Vertices(_) => BufferTarget::Vertex,
            BufferData::Indices(_) => BufferTarget::Index,
        };
        self.buffers.insert(id);
        self.commands.push(GpuCommand::CreateBuffer {
            id,
            target,
            bytes: data.byte_len(),
        });
        Ok(BufferHandle::from_raw(id))
    }

    fn set_vertex_layout(&mut self, layout: &[VertexAttribute]) {
        self.commands.push(GpuCommand::SetVertexLayout(layout.to_vec()));
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> Result<(), GraphicsError> {
        Self::forget(&mut self.vertex_arrays, "vertex array", vertex_array.raw())?;
        self.commands.push(GpuCommand::DeleteVertexArray(vertex_array.raw()));
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) -> Result<(), GraphicsError> {
        Self::forget(&mut self.buffers, "buffer", buffer.raw())?;
        self.commands.push(GpuCommand::DeleteBuffer(buffer.raw()));
        Ok(())
    }

    fn create_texture(&mut self, image: &TextureImage) -> Result<TextureHandle, GraphicsError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.pixels.len() != expected {
            return Err(GraphicsError::Backend(format!(
                "texture data is {} bytes, expected {expected}",
                image.pixels.len()
            )));
        }
        let id = self.allocate()?;
        self.textures.insert(id);
        self.commands.push(GpuCommand::CreateTexture {
            id,
            width: image.width,
            height: image.height,
        });
        Ok(TextureHandle::from_raw(id))
    }

    fn delete_texture(&mut self, texture: TextureHandle) -> Result<(), GraphicsError> {
        Self::forget(&mut self.textures, "texture", texture.raw())?;
        self.commands.push(GpuCommand::DeleteTexture(texture.raw()));
        Ok(())
    }

    fn draw_elements(&mut self, primitive: PrimitiveKind, count: u32, index_type: IndexType) {
        self.commands.push(GpuCommand::DrawElements {
            primitive,
            count,
            index_type,
        });
    }
}

/// A [`Windowing`] backend with no display.
///
/// Each call to [`Windowing::poll_events`] hands out the next scripted batch
/// of events (or nothing once the script runs out).
#[derive(Debug, Default)]
pub struct HeadlessWindowing {
    script: VecDeque<Vec<InputEvent>>,
    fail_create: Option<String>,
    close_after: Option<u64>,
    should_close: bool,
    next_id: u32,
    open_windows: HashSet<u32>,
    created: u32,
    destroyed: u32,
    presented: u64,
}

impl HeadlessWindowing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make window creation fail with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_create: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Request close after `frames` presents.
    #[must_use]
    pub fn close_after(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    /// Queue the events delivered by the next poll.
    pub fn push_frame(&mut self, events: Vec<InputEvent>) {
        self.script.push_back(events);
    }

    #[must_use]
    pub fn with_frame(mut self, events: Vec<InputEvent>) -> Self {
        self.push_frame(events);
        self
    }

    #[must_use]
    pub fn presented(&self) -> u64 {
        self.presented
    }

    #[must_use]
    pub fn created(&self) -> u32 {
        self.created
    }

    #[must_use]
    pub fn destroyed(&self) -> u32 {
        self.destroyed
    }

    #[must_use]
    pub fn open_windows(&self) -> usize {
        self.open_windows.len()
    }
}

impl Windowing for HeadlessWindowing {
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle, WindowError> {
        if let Some(reason) = &self.fail_create {
            return Err(WindowError::Create(reason.clone()));
        }
        self.next_id += 1;
        self.created += 1;
        self.open_windows.insert(self.next_id);
        debug!(title = %config.title, width = config.width, height = config.height, "headless window created");
        Ok(WindowHandle::from_raw(self.next_id, config.width, config.height))
    }

    fn should_close(&self, _window: &WindowHandle) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, _window: &WindowHandle, value: bool) {
        self.should_close = value;
    }

    fn present(&mut self, _window: &WindowHandle) {
        self.presented += 1;
        if self.close_after.is_some_and(|limit| self.presented >= limit) {
            self.should_close = true;
        }
    }

    fn poll_events(&mut self, _window: &WindowHandle) -> Vec<InputEvent> {
        self.script.pop_front().unwrap_or_default()
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        if self.open_windows.remove(&window.raw()) {
            self.destroyed += 1;
        }
    }
}
