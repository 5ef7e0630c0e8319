//! Backend module for talking to the running engine
//!
//! This module handles all engine communication in a separate thread to keep
//! the UI responsive. It uses crossbeam channels for thread-safe communication
//! with the UI glue.
//!
//! # Architecture
//!
//! The backend runs in a separate thread from the UI, communicating via channels:
//!
//! - [`SessionCommand`] - Messages sent from UI to backend (edits, selection, refresh control)
//! - [`SessionMessage`] - Messages sent from backend to UI (snapshots, write results, console)
//! - [`InspectorHandle`] - UI-side handle for sending commands and receiving messages
//! - [`InspectorBackend`] - Main backend entry point that owns the worker
//!
//! # Components
//!
//! - [`HttpEngineApi`] - Gateway to the engine's JSON API over HTTP
//! - [`MockEngine`] - In-memory engine for tests and offline demos
//! - [`SessionWorker`] - Worker loop that drains commands and fires timers
//!
//! # Example
//!
//! ```ignore
//! use live_inspector::backend::{HttpEngineApi, InspectorBackend};
//! use live_inspector::config::InspectorConfig;
//! use live_inspector::sync::SystemClock;
//! use std::sync::Arc;
//!
//! let config = InspectorConfig::default();
//! let api = HttpEngineApi::new(&config.connection)?;
//! let (backend, handle) = InspectorBackend::new(config, Box::new(api), Arc::new(SystemClock));
//!
//! std::thread::spawn(move || backend.run());
//!
//! handle.select(2);
//! for msg in handle.drain() {
//!     if let SessionMessage::ComponentsChanged(components) = msg {
//!         // render
//!     }
//! }
//! ```

pub mod api_trait;
pub mod http_api;
pub mod mock_engine;
pub mod worker;

pub use api_trait::{ApiStats, EngineApi};
pub use http_api::HttpEngineApi;
pub use mock_engine::{ApiCall, MockEngine};
pub use worker::SessionWorker;

use crate::config::InspectorConfig;
use crate::console::ConsoleEntry;
use crate::sync::{Clock, WriteRequest};
use crate::types::{
    Component, ComponentId, ConnectionStatus, Entity, EngineStats, EntityId,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// An input gained focus
    FieldFocused,
    /// An input lost focus
    FieldBlurred,
    /// A field changed while typing; debounced
    EditField(WriteRequest),
    /// A field's final value; sent immediately
    CommitField(WriteRequest),
    /// Enable or disable a component
    ToggleComponent {
        component: ComponentId,
        enabled: bool,
    },
    /// Select an entity and load its detail
    Select(EntityId),
    /// Drop the current selection
    ClearSelection,
    /// Change the auto-refresh interval
    SetRefreshInterval(Duration),
    /// Turn auto-refresh on or off
    SetAutoRefresh(bool),
    /// Refresh the entity list now
    RefreshNow,
    /// Pause a running engine or resume a paused one
    TogglePause,
    /// Probe the engine and reload on success
    CheckConnection,
    /// Write the full scene document to a file
    ExportScene(PathBuf),
    /// Clear the status console
    ClearConsole,
    /// Request current statistics
    RequestStats,
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// Connection status changed
    ConnectionStatus(ConnectionStatus),
    /// Cached engine pause state changed; writes are allowed while true
    EnginePaused(bool),
    /// The entity list changed
    SnapshotReplaced(Arc<Vec<Entity>>),
    /// Selection changed
    SelectionChanged(Option<EntityId>),
    /// Detail of the selected entity loaded or patched
    DetailLoaded(Entity),
    /// Component list of the selected entity changed
    ComponentsChanged(Vec<Component>),
    /// A write finished; the error is already in the console
    WriteCompleted {
        request: WriteRequest,
        result: Result<(), String>,
    },
    /// A toggle was refused; the checkbox must show `enabled` again
    ToggleReverted {
        component: ComponentId,
        enabled: bool,
    },
    /// Engine counters update
    Stats(EngineStats),
    /// Gateway request statistics
    ApiStats(ApiStats),
    /// New status console line
    Console(ConsoleEntry),
    /// Scene document written to disk
    SceneExported(PathBuf),
    /// Backend is shutting down
    Shutdown,
}

impl SessionMessage {
    /// Messages the UI must act on; these are never dropped on a full queue
    pub fn must_deliver(&self) -> bool {
        matches!(
            self,
            SessionMessage::WriteCompleted { .. }
                | SessionMessage::ToggleReverted { .. }
                | SessionMessage::Shutdown
        )
    }
}

/// UI-side handle to the backend
pub struct InspectorHandle {
    /// Receiver for backend messages
    pub receiver: Receiver<SessionMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<SessionCommand>,
}

impl InspectorHandle {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<SessionMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<SessionMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: SessionCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    pub fn field_focused(&self) {
        let _ = self.command_sender.send(SessionCommand::FieldFocused);
    }

    pub fn field_blurred(&self) {
        let _ = self.command_sender.send(SessionCommand::FieldBlurred);
    }

    /// Queue a debounced edit
    pub fn edit_field(&self, request: WriteRequest) {
        let _ = self.command_sender.send(SessionCommand::EditField(request));
    }

    /// Send an edit immediately
    pub fn commit_field(&self, request: WriteRequest) {
        let _ = self.command_sender.send(SessionCommand::CommitField(request));
    }

    pub fn toggle_component(&self, component: ComponentId, enabled: bool) {
        let _ = self
            .command_sender
            .send(SessionCommand::ToggleComponent { component, enabled });
    }

    pub fn select(&self, id: EntityId) {
        let _ = self.command_sender.send(SessionCommand::Select(id));
    }

    pub fn clear_selection(&self) {
        let _ = self.command_sender.send(SessionCommand::ClearSelection);
    }

    pub fn set_refresh_interval(&self, interval: Duration) {
        let _ = self
            .command_sender
            .send(SessionCommand::SetRefreshInterval(interval));
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        let _ = self
            .command_sender
            .send(SessionCommand::SetAutoRefresh(enabled));
    }

    pub fn refresh_now(&self) {
        let _ = self.command_sender.send(SessionCommand::RefreshNow);
    }

    pub fn toggle_pause(&self) {
        let _ = self.command_sender.send(SessionCommand::TogglePause);
    }

    pub fn export_scene(&self, path: impl Into<PathBuf>) {
        let _ = self
            .command_sender
            .send(SessionCommand::ExportScene(path.into()));
    }

    pub fn clear_console(&self) {
        let _ = self.command_sender.send(SessionCommand::ClearConsole);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(SessionCommand::Shutdown);
    }
}

/// The inspector backend that runs in a separate thread
pub struct InspectorBackend {
    /// Configuration
    config: InspectorConfig,
    /// Gateway handed to the session
    api: Box<dyn EngineApi>,
    /// Time source for all session timers
    clock: Arc<dyn Clock>,
    /// Receiver for commands from the UI
    command_receiver: Receiver<SessionCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<SessionMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
}

impl InspectorBackend {
    /// Create a new backend with communication channels
    pub fn new(
        config: InspectorConfig,
        api: Box<dyn EngineApi>,
        clock: Arc<dyn Clock>,
    ) -> (Self, InspectorHandle) {
        let (cmd_tx, cmd_rx) = bounded(256);
        // Bounded so a stalled UI cannot grow the queue without limit
        let (msg_tx, msg_rx) = bounded(4096);

        let backend = Self {
            config,
            api,
            clock,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        let handle = InspectorHandle {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, handle)
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = SessionWorker::new(
            &self.config,
            self.api,
            self.clock,
            self.command_receiver,
            self.message_sender,
            self.running,
        );
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SystemClock;
    use crate::types::EntityField;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_backend_creation() {
        let config = InspectorConfig::default();
        let (backend, handle) =
            InspectorBackend::new(config, Box::new(MockEngine::sample()), Arc::new(SystemClock));

        // Backend should be running
        assert!(backend.running.load(Ordering::SeqCst));

        // Should be able to send commands
        assert!(handle.send_command(SessionCommand::Shutdown));
    }

    #[test]
    fn test_handle_commands_reach_queue() {
        let config = InspectorConfig::default();
        let (backend, handle) =
            InspectorBackend::new(config, Box::new(MockEngine::sample()), Arc::new(SystemClock));

        handle.select(2);
        handle.commit_field(WriteRequest::EntityProperty {
            entity: 2,
            field: EntityField::Name,
            value: "Crate".into(),
        });
        handle.toggle_pause();
        handle.shutdown();

        let queued: Vec<SessionCommand> = backend.command_receiver.try_iter().collect();
        assert_eq!(queued.len(), 4);
        assert!(matches!(queued[0], SessionCommand::Select(2)));
        assert!(matches!(queued[3], SessionCommand::Shutdown));
    }
}
