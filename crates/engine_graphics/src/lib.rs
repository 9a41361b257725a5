//! # engine_graphics
//!
//! The seams between the engine core and the platform: windowing, input
//! events and the graphics context. Also home of the [`GpuResourceBinder`],
//! which is the only code that turns meshes into GPU buffers and deletes
//! them again.
//!
//! - [`Windowing`] / [`WindowConfig`] / [`InputEvent`] — window lifecycle and input.
//! - [`GraphicsDevice`] — the graphics operations the core consumes.
//! - [`GpuResourceBinder`] — lazy, memoized mesh upload and exactly-once release.
//! - [`headless`] — [`HeadlessWindowing`] and [`RecordingDevice`] for running
//!   without a display.

pub mod binder;
pub mod device;
pub mod error;
pub mod headless;
pub mod window;

pub use binder::GpuResourceBinder;
pub use device::{
    BufferData, GraphicsDevice, IndexType, PrimitiveKind, TextureImage, VERTEX_LAYOUT,
    VertexAttribute,
};
pub use error::{GraphicsError, WindowError};
pub use headless::{GpuCommand, HeadlessWindowing, RecordingDevice};
pub use window::{InputEvent, Key, KeyAction, WindowConfig, WindowHandle, Windowing};
