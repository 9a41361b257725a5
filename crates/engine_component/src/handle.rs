//! Opaque graphics handles stored inside components.
//!
//! Buffer, vertex-array and program handles are deliberately neither `Clone`
//! nor `Copy`: each one is owned by exactly one place, and deleting it on the
//! device consumes it. Texture handles are `Copy` because several materials
//! may share one texture.

/// An uploaded vertex or index buffer.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

/// A vertex-array object capturing attribute layout and buffer bindings.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(u32);

/// A linked shader program.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u32);

/// An uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

macro_rules! raw_handle {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                /// Wrap a raw backend identifier. Only graphics backends should call this.
                #[must_use]
                pub const fn from_raw(raw: u32) -> Self {
                    Self(raw)
                }

                /// Returns the raw backend identifier.
                #[must_use]
                pub const fn raw(&self) -> u32 {
                    self.0
                }
            }
        )*
    };
}

raw_handle!(BufferHandle, VertexArrayHandle, ProgramHandle, TextureHandle);
