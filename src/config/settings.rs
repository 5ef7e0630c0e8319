//! Configuration sections
//!
//! Each section maps to a TOML table in `inspector.toml`:
//!
//! - [`ConnectionConfig`] - Where the engine API lives and how long to wait for it
//! - [`RefreshConfig`] - Reconciliation loop interval and auto-refresh toggle
//! - [`EditingConfig`] - Debounce and edit-grace timings, write acceptance leniency
//! - [`ConsoleConfig`] - Status console size
//! - [`LoggingConfig`] - Optional rolling log file

use crate::types::AckLeniency;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default engine API base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Default reconciliation interval in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;

/// Default debounce delay for field edits in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default grace period after a field loses focus in milliseconds
pub const DEFAULT_EDIT_GRACE_MS: u64 = 500;

/// Default HTTP timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default number of console entries kept
pub const DEFAULT_CONSOLE_CAPACITY: usize = 50;

/// Engine API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ConnectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Reconciliation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Interval between refresh ticks in milliseconds
    pub interval_ms: u64,

    /// Start the loop automatically
    pub auto_refresh: bool,

    /// Poll `/stats` on every tick as well
    pub refresh_stats: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            auto_refresh: true,
            refresh_stats: true,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Edit coalescing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Quiet period before a burst of edits to one field is sent
    pub debounce_ms: u64,

    /// How long the editing flag stays up after a field loses focus
    pub grace_ms: u64,

    /// How component property acknowledgements are judged
    pub component_leniency: AckLeniency,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            grace_ms: DEFAULT_EDIT_GRACE_MS,
            component_leniency: AckLeniency::SuccessOrMessage,
        }
    }
}

impl EditingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// Status console settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Number of entries retained
    pub capacity: usize,

    /// Print every session message, not only console entries
    pub show_debug: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CONSOLE_CAPACITY,
            show_debug: false,
        }
    }
}

/// Log file settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for a daily rolling log file; stdout only when unset
    pub log_dir: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is not set
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_editor() {
        assert_eq!(RefreshConfig::default().interval(), Duration::from_millis(2000));
        assert_eq!(EditingConfig::default().debounce(), Duration::from_millis(300));
        assert_eq!(EditingConfig::default().grace(), Duration::from_millis(500));
        assert_eq!(ConsoleConfig::default().capacity, 50);
        assert_eq!(
            EditingConfig::default().component_leniency,
            AckLeniency::SuccessOrMessage
        );
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let cfg: RefreshConfig = toml::from_str("interval_ms = 750").unwrap();
        assert_eq!(cfg.interval_ms, 750);
        assert!(cfg.auto_refresh);
    }
}
