//! Configuration module for the live inspector
//!
//! Configuration is read once at startup from a TOML file. Missing files and
//! missing keys fall back to defaults; user-facing settings are never written
//! back by the inspector itself.
//!
//! # Config Location
//!
//! Unless a path is given explicitly, the file is looked up in the
//! platform-appropriate config directory under `dev.icecrystal.live-inspector`:
//!
//! - **Linux**: `~/.config/dev.icecrystal.live-inspector/inspector.toml`
//! - **macOS**: `~/Library/Application Support/dev.icecrystal.live-inspector/inspector.toml`
//! - **Windows**: `%APPDATA%\dev.icecrystal.live-inspector\inspector.toml`
//!
//! # Environment
//!
//! `LIVE_INSPECTOR_URL` overrides `connection.base_url`.
//!
//! # Example
//!
//! ```ignore
//! use live_inspector::config::InspectorConfig;
//!
//! let config = InspectorConfig::load_or_default(None);
//! println!("talking to {}", config.connection.base_url);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{InspectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.icecrystal.live-inspector";

/// Config filename
pub const CONFIG_FILE: &str = "inspector.toml";

/// Environment variable overriding the engine base URL
pub const BASE_URL_ENV: &str = "LIVE_INSPECTOR_URL";

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete inspector configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InspectorConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub editing: EditingConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl InspectorConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| InspectorError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, applying environment overrides
    ///
    /// A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                InspectorError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` or the default location, returning defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => p,
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                return config;
            }
        };

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    /// Write this configuration as TOML
    ///
    /// Only used to generate a starter file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| InspectorError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| InspectorError::Config(format!("Failed to write config: {}", e)))
    }

    /// Apply `LIVE_INSPECTOR_URL` if set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.connection.base_url = url.trim().to_string();
            }
        }
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        let url = &self.connection.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(InspectorError::Config(format!(
                "connection.base_url must be http(s), got '{}'",
                url
            )));
        }
        if self.refresh.interval_ms == 0 {
            return Err(InspectorError::Config(
                "refresh.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.editing.debounce_ms == 0 || self.editing.grace_ms == 0 {
            return Err(InspectorError::Config(
                "editing delays must be greater than zero".to_string(),
            ));
        }
        if self.console.capacity == 0 {
            return Err(InspectorError::Config(
                "console.capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
