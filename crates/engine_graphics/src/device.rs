//! The graphics-context seam.
//!
//! [`GraphicsDevice`] is the narrow slice of a graphics API the engine core
//! needs: one shader program, vertex arrays, buffers, textures and indexed
//! draws. Implementations are bound to the thread that owns the context and
//! are never shared across threads.

use engine_component::{BufferHandle, ProgramHandle, TextureHandle, VertexArrayHandle, Vertex};
use engine_math::Mat4;

use crate::error::GraphicsError;
use crate::window::WindowHandle;

/// Primitive assembly mode for a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangles,
    Lines,
    Points,
}

/// Element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

/// Data for a new buffer; the variant decides the buffer target.
#[derive(Debug, Clone, Copy)]
pub enum BufferData<'a> {
    /// Interleaved vertex attributes.
    Vertices(&'a [f32]),
    /// Triangle-list indices.
    Indices(&'a [u32]),
}

impl BufferData<'_> {
    /// Size of the payload in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            BufferData::Vertices(data) => std::mem::size_of_val(*data),
            BufferData::Indices(data) => std::mem::size_of_val(*data),
        }
    }
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Distance between consecutive vertices, in bytes.
    pub stride: usize,
    /// Offset of this attribute from the start of a vertex, in bytes.
    pub offset: usize,
}

/// Attribute layout of [`Vertex`]: position, texcoord, normal, interleaved.
pub const VERTEX_LAYOUT: [VertexAttribute; 3] = [
    VertexAttribute {
        location: 0,
        components: 3,
        stride: Vertex::STRIDE_BYTES,
        offset: 0,
    },
    VertexAttribute {
        location: 1,
        components: 2,
        stride: Vertex::STRIDE_BYTES,
        offset: Vertex::TEX_COORDS_OFFSET,
    },
    VertexAttribute {
        location: 2,
        components: 3,
        stride: Vertex::STRIDE_BYTES,
        offset: Vertex::NORMAL_OFFSET,
    },
];

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// Graphics-context operations consumed by the engine core.
///
/// Resource creation and deletion report failures. Per-frame state commands
/// (`clear`, `use_program`, binds, draws) do not: once the engine is running
/// the context is assumed valid.
pub trait GraphicsDevice {
    /// Attach a context to `window` and make it current.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Context`] if no context can be created.
    fn init_context(&mut self, window: &WindowHandle) -> Result<(), GraphicsError>;

    /// Returns `true` once [`GraphicsDevice::init_context`] has succeeded.
    fn has_context(&self) -> bool;

    /// Compile and link a program from vertex and fragment sources.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ShaderCompile`] with the backend log on
    /// failure, or [`GraphicsError::NoContext`].
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, GraphicsError>;

    fn use_program(&mut self, program: &ProgramHandle);

    /// # Errors
    ///
    /// Returns [`GraphicsError::UnknownHandle`] if the program is not live.
    fn delete_program(&mut self, program: ProgramHandle) -> Result<(), GraphicsError>;

    /// Set a `mat4` uniform on the active program.
    fn set_uniform_mat4(&mut self, program: &ProgramHandle, name: &str, value: &Mat4);

    /// Clear color and depth buffers to `color`.
    fn clear(&mut self, color: [f32; 4]);

    /// # Errors
    ///
    /// Returns [`GraphicsError::NoContext`] or a backend error.
    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, GraphicsError>;

    /// Bind a vertex array, or unbind with `None`.
    fn bind_vertex_array(&mut self, vertex_array: Option<&VertexArrayHandle>);

    /// Create a buffer and upload `data`. Index buffers are captured by the
    /// currently bound vertex array.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::NoContext`] or a backend error.
    fn create_buffer(&mut self, data: BufferData<'_>) -> Result<BufferHandle, GraphicsError>;

    /// Describe the layout of the most recently created vertex buffer to the
    /// bound vertex array.
    fn set_vertex_layout(&mut self, layout: &[VertexAttribute]);

    /// # Errors
    ///
    /// Returns [`GraphicsError::UnknownHandle`] if the array is not live.
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> Result<(), GraphicsError>;

    /// # Errors
    ///
    /// Returns [`GraphicsError::UnknownHandle`] if the buffer is not live.
    fn delete_buffer(&mut self, buffer: BufferHandle) -> Result<(), GraphicsError>;

    /// # Errors
    ///
    /// Returns [`GraphicsError::NoContext`] or a backend error.
    fn create_texture(&mut self, image: &TextureImage) -> Result<TextureHandle, GraphicsError>;

    /// # Errors
    ///
    /// Returns [`GraphicsError::UnknownHandle`] if the texture is not live.
    fn delete_texture(&mut self, texture: TextureHandle) -> Result<(), GraphicsError>;

    /// Issue an indexed draw using the bound vertex array.
    fn draw_elements(&mut self, primitive: PrimitiveKind, count: u32, index_type: IndexType);
}
