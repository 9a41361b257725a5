//! The engine loop.
//!
//! [`Engine`] owns the windowing backend, the graphics device, the world and
//! the render system, and walks them through a fixed lifecycle:
//!
//! ```text
//! Uninitialized -> Initialized -> Running -> ShuttingDown -> Terminated
//! ```
//!
//! Initialization either completes or leaves nothing behind. Once running,
//! every frame computes its own delta time, calls the frame callback,
//! renders, presents and then dispatches input.

use std::path::Path;

use tracing::{debug, error, info, warn};

use engine_assets::{AssetError, AssetLoader, Model, load_model};
use engine_component::{ComponentKind, Material, TextureHandle, World};
use engine_graphics::{GraphicsDevice, GraphicsError, WindowError, WindowHandle, Windowing};
use engine_render::{RenderError, RenderSystem};

use crate::clock::FrameClock;
use crate::config::{ConfigError, EngineConfig};
use crate::context::FrameContext;
use crate::input::InputManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    /// An operation was attempted in the wrong lifecycle state.
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },
}

pub struct Engine<W: Windowing, G: GraphicsDevice> {
    config: EngineConfig,
    windowing: W,
    device: G,
    window: Option<WindowHandle>,
    render: Option<RenderSystem>,
    /// Textures created by [`Engine::load_model`] and not yet released.
    textures: Vec<TextureHandle>,
    world: World,
    input: InputManager,
    clock: FrameClock,
    state: EngineState,
    shutdown_requested: bool,
    frames: u64,
}

impl<W: Windowing, G: GraphicsDevice> std::fmt::Debug for Engine<W, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("window", &self.window)
            .field("entities", &self.world.entity_count())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<W: Windowing, G: GraphicsDevice> Engine<W, G> {
    /// An engine that has not acquired anything yet.
    #[must_use]
    pub fn new(config: EngineConfig, windowing: W, device: G) -> Self {
        let world = World::with_policy(config.duplicate_policy);
        Self {
            config,
            windowing,
            device,
            window: None,
            render: None,
            textures: Vec::new(),
            world,
            input: InputManager::new(),
            clock: FrameClock::new(),
            state: EngineState::Uninitialized,
            shutdown_requested: false,
            frames: 0,
        }
    }

    /// Build and initialize an engine in one step.
    ///
    /// # Errors
    ///
    /// See [`Engine::initialize`].
    pub fn init(config: EngineConfig, windowing: W, device: G) -> Result<Self, EngineError> {
        let mut engine = Self::new(config, windowing, device);
        engine.initialize()?;
        Ok(engine)
    }

    /// Create the window, attach the graphics context and compile the
    /// shader program.
    ///
    /// On failure everything acquired so far is released and the engine
    /// stays [`EngineState::Uninitialized`].
    ///
    /// # Errors
    ///
    /// Returns the window, context or shader error, or
    /// [`EngineError::InvalidState`] if already initialized.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        self.expect_state(EngineState::Uninitialized, "initialize")?;

        let window = self.windowing.create_window(&self.config.window)?;
        if let Err(err) = self.device.init_context(&window) {
            error!(error = %err, "graphics context initialisation failed");
            self.windowing.destroy_window(window);
            return Err(err.into());
        }
        let render = match RenderSystem::new(&mut self.device, &self.config.render) {
            Ok(render) => render,
            Err(err) => {
                error!(error = %err, "render system initialisation failed");
                self.windowing.destroy_window(window);
                return Err(err.into());
            }
        };

        info!(
            title = %self.config.window.title,
            width = self.config.window.width,
            height = self.config.window.height,
            "engine initialised"
        );
        self.window = Some(window);
        self.render = Some(render);
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Run frames until shutdown is requested, the window closes or
    /// `max_frames` is reached, then shut down.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless initialized. A frame
    /// error stops the loop and is returned after shutdown.
    pub fn run<F>(&mut self, mut on_frame: F) -> Result<(), EngineError>
    where
        F: FnMut(&mut FrameContext<'_>),
    {
        self.expect_state(EngineState::Initialized, "run")?;
        self.state = EngineState::Running;
        info!(max_frames = ?self.config.max_frames, "engine running");

        let result = self.frame_loop(&mut on_frame);
        if let Err(err) = &result {
            error!(frame = self.frames, error = %err, "frame failed, shutting down");
        }
        let shutdown = self.shutdown();
        result?;
        shutdown
    }

    fn frame_loop<F>(&mut self, on_frame: &mut F) -> Result<(), EngineError>
    where
        F: FnMut(&mut FrameContext<'_>),
    {
        let Self {
            config,
            windowing,
            device,
            window,
            render,
            world,
            input,
            clock,
            shutdown_requested,
            frames,
            ..
        } = self;
        let (Some(window), Some(render)) = (window.as_ref(), render.as_mut()) else {
            return Err(EngineError::InvalidState {
                operation: "run",
                state: EngineState::Running,
            });
        };

        while !*shutdown_requested && !windowing.should_close(window) {
            if config.max_frames.is_some_and(|max| *frames >= max) {
                debug!(frames = *frames, "frame limit reached");
                break;
            }
            let delta_time = clock.tick();

            on_frame(&mut FrameContext::new(world, delta_time, *frames, shutdown_requested));
            render.update(device, world)?;
            windowing.present(window);
            *frames += 1;

            let events = windowing.poll_events(window);
            input.process(
                events,
                &mut FrameContext::new(world, delta_time, *frames, shutdown_requested),
            );
        }
        if *shutdown_requested {
            windowing.set_should_close(window, true);
        }
        info!(frames = *frames, elapsed = ?clock.elapsed(), "engine loop finished");
        Ok(())
    }

    /// Release the world's GPU resources, the shader program, every loaded
    /// or still referenced material texture and the window.
    ///
    /// Safe to call in any state and more than once.
    ///
    /// # Errors
    ///
    /// Returns the first release failure; the rest is still released.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.state == EngineState::Terminated {
            return Ok(());
        }
        self.state = EngineState::ShuttingDown;
        let mut first_error: Option<EngineError> = None;

        if let Some(mut render) = self.render.take()
            && let Err(err) = render.destroy(&mut self.device, &mut self.world)
        {
            first_error.get_or_insert(err.into());
        }

        for texture in self.material_textures() {
            if let Err(err) = self.device.delete_texture(texture) {
                first_error.get_or_insert(err.into());
            }
        }
        self.world.store_mut().remove_kind(ComponentKind::Material);

        if let Some(window) = self.window.take() {
            self.windowing.destroy_window(window);
        }

        self.state = EngineState::Terminated;
        match first_error {
            Some(err) => {
                warn!(error = %err, "engine shut down with errors");
                Err(err)
            }
            None => {
                info!(frames = self.frames, "engine terminated");
                Ok(())
            }
        }
    }

    /// Loaded textures plus any texture a live material refers to, without
    /// duplicates.
    fn material_textures(&mut self) -> Vec<TextureHandle> {
        let mut textures = std::mem::take(&mut self.textures);
        for entity in self.world.entities_with(ComponentKind::Material) {
            if let Some(material) = self.world.get::<Material>(entity) {
                for texture in [material.diffuse, material.specular] {
                    if !textures.contains(&texture) {
                        textures.push(texture);
                    }
                }
            }
        }
        textures
    }

    /// Load a model with this engine's device and binder.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless initialized, or the
    /// asset error.
    pub fn load_model<L: AssetLoader + ?Sized>(
        &mut self,
        loader: &L,
        obj_path: &Path,
        mtl_path: &Path,
    ) -> Result<Model, EngineError> {
        let state = self.state;
        let Some(render) = self.render.as_mut() else {
            return Err(EngineError::InvalidState {
                operation: "load a model",
                state,
            });
        };
        let model = load_model(loader, &mut self.device, render.binder_mut(), obj_path, mtl_path)?;
        for texture in model.textures() {
            if !self.textures.contains(&texture) {
                self.textures.push(texture);
            }
        }
        Ok(model)
    }

    /// Release a model that was loaded but never spawned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless initialized, or the first
    /// release failure.
    pub fn release_model(&mut self, model: Model) -> Result<(), EngineError> {
        let state = self.state;
        let Some(render) = self.render.as_mut() else {
            return Err(EngineError::InvalidState {
                operation: "release a model",
                state,
            });
        };
        let owned = model.textures();
        self.textures.retain(|texture| !owned.contains(texture));
        Ok(model.release(&mut self.device, render.binder_mut())?)
    }

    fn expect_state(&self, expected: EngineState, operation: &'static str) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    /// Frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn windowing(&self) -> &W {
        &self.windowing
    }

    #[must_use]
    pub fn device(&self) -> &G {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut G {
        &mut self.device
    }

    /// Width over height of the configured window.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.config.window.aspect_ratio()
    }
}

impl<W: Windowing, G: GraphicsDevice> Drop for Engine<W, G> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "error during engine drop");
        }
    }
}
