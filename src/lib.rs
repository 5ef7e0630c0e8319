//! # Live Inspector: live scene editing client
//!
//! A client for a running game engine that polls the scene graph over the
//! engine's JSON/HTTP API, exposes it for inspection, and pushes user edits
//! back while the simulation keeps changing underneath.
//!
//! ## Architecture
//!
//! - **Backend**: gateway to the engine API and the worker thread that owns the session
//! - **Sync**: snapshot store, debounced writes, edit tracking and periodic reconciliation
//! - **Console**: bounded, timestamped status log for the user
//! - **Communication**: crossbeam channels between the worker and the UI glue
//!
//! ## Configuration
//!
//! Settings are read from `inspector.toml` in the platform config directory
//! under `dev.icecrystal.live-inspector`:
//!
//! - **Linux**: `~/.config/dev.icecrystal.live-inspector/`
//! - **macOS**: `~/Library/Application Support/dev.icecrystal.live-inspector/`
//! - **Windows**: `%APPDATA%\dev.icecrystal.live-inspector\`
//!
//! ## Example
//!
//! ```ignore
//! use live_inspector::{
//!     backend::{HttpEngineApi, InspectorBackend, SessionMessage},
//!     config::InspectorConfig,
//!     sync::SystemClock,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = InspectorConfig::load_or_default(None);
//!     let api = HttpEngineApi::new(&config.connection)?;
//!     let (backend, handle) = InspectorBackend::new(config, Box::new(api), Arc::new(SystemClock));
//!
//!     std::thread::spawn(move || backend.run());
//!
//!     loop {
//!         for msg in handle.drain() {
//!             if let SessionMessage::Console(entry) = msg {
//!                 println!("{}", entry);
//!             }
//!         }
//!         std::thread::sleep(std::time::Duration::from_millis(100));
//!     }
//! }
//! ```

pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod sync;
pub mod types;

// Re-export commonly used types
pub use backend::{EngineApi, HttpEngineApi, InspectorBackend, InspectorHandle, MockEngine, SessionMessage};
pub use config::InspectorConfig;
pub use error::{InspectorError, Result};
pub use sync::{Session, SessionEvent, WriteRequest};
pub use types::{Component, Entity, FieldKey, PropertyPath, PropertyValue, Transform};
