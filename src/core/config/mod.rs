//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$HUBTREE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hubtree/config.toml`
//! 3. `~/.hubtree/config.toml`
//!
//! Unlike most tools there is no useful default: a repository binding
//! needs at least `repository`, so a missing file is an error at
//! [`Config::load`]. Callers that build settings in code skip this module
//! and hand [`Settings`] straight to the gateway.
//!
//! # Example
//!
//! ```no_run
//! use hubtree::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Repository: {}", config.settings.repo_name().unwrap());
//! println!("Reference: {}", config.settings.reference());
//! ```

pub mod schema;

pub use schema::{CredentialsConfig, Settings};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "HUBTREE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no config file found (set ${var} or create ~/.hubtree/config.toml)", var = CONFIG_ENV_VAR)]
    NotFound,

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded and validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The validated settings
    pub settings: Settings,
    /// Path the settings were read from
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file exists, or a read,
    /// parse, or validation error for the first file found.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::locate()?.ok_or(ConfigError::NotFound)?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::read_settings(path)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(Self {
            settings,
            path: path.to_path_buf(),
        })
    }

    /// Find the first existing config file.
    fn locate() -> Result<Option<PathBuf>, ConfigError> {
        // 1. Check $HUBTREE_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/hubtree/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("hubtree/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 3. Check ~/.hubtree/config.toml
        let path = Self::default_config_path()?;
        if path.exists() {
            return Ok(Some(path));
        }

        Ok(None)
    }

    /// Read and parse a settings file.
    fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical config path, `~/.hubtree/config.toml`.
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".hubtree/config.toml"))
    }

    /// Get the path the settings were loaded from.
    pub fn loaded_from(&self) -> &Path {
        &self.path
    }
}
