//! Engine configuration.
//!
//! Read from a JSON file named on the command line or in the
//! `ENGINE_CONFIG` environment variable. Every field is optional; missing
//! fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use engine_component::DuplicatePolicy;
use engine_graphics::WindowConfig;
use engine_render::RenderConfig;

/// The environment variable naming a config file.
pub const ENGINE_CONFIG_ENV: &str = "ENGINE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything [`Engine`](crate::Engine) needs to start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    /// Stop the loop after this many frames.
    pub max_frames: Option<u64>,
    /// What adding a component twice to the same entity does.
    pub duplicate_policy: DuplicatePolicy,
}

impl EngineConfig {
    #[must_use]
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Read a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid config JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Load from `path` if given, else from the file named by
    /// [`ENGINE_CONFIG_ENV`], else use defaults.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::from_file`].
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path.or_else(|| std::env::var_os(ENGINE_CONFIG_ENV).map(PathBuf::from)) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}
