//! # engine_app
//!
//! Wires the engine crates into a running application.
//!
//! - [`Engine`] — lifecycle state machine and frame loop.
//! - [`EngineConfig`] — JSON configuration with defaults.
//! - [`InputManager`] — key, mouse and scroll dispatch.
//! - [`FlyCamera`] — WASD and mouse-look camera controller.
//! - [`scene`] — spawn helpers for cubes, planes, models, cameras and lights.

pub mod clock;
pub mod config;
pub mod context;
pub mod controller;
pub mod engine;
pub mod input;
pub mod scene;

pub use clock::FrameClock;
pub use config::{ConfigError, ENGINE_CONFIG_ENV, EngineConfig};
pub use context::FrameContext;
pub use controller::FlyCamera;
pub use engine::{Engine, EngineError, EngineState};
pub use input::{ActionId, InputManager};
