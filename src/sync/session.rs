//! The session actor
//!
//! [`Session`] owns every piece of sync state: the gateway, the snapshot
//! store, the edit tracker, the debounce coalescer and the reconcile loop.
//! It consumes [`SessionEvent`]s one at a time and never runs two of them
//! concurrently, so the skip-while-editing rule stands in for locking.
//! Everything the UI needs to know comes out as [`SessionMessage`]s, drained
//! with [`Session::take_messages`].

use super::clock::Clock;
use super::debounce::DebounceCoalescer;
use super::edit_tracker::EditTracker;
use super::reconcile::{ReconcileLoop, TickOutcome};
use super::snapshot::SnapshotStore;
use super::write_pipeline::{AppliedWrite, WritePipeline, WriteRequest};
use crate::backend::{ApiStats, EngineApi, SessionMessage};
use crate::config::InspectorConfig;
use crate::console::{Console, ConsoleLevel, LogSink};
use crate::error::{InspectorError, Result};
use crate::types::{
    ComponentId, ConnectionStatus, Entity, EngineStats, EntityId, FieldKey,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Input consumed by the session
#[derive(Debug)]
pub enum SessionEvent {
    /// An input gained focus
    FieldFocused,
    /// An input lost focus
    FieldBlurred,
    /// A field changed; sent after the debounce delay unless superseded
    FieldEdited(WriteRequest),
    /// A field's final value; sent at once
    FieldCommitted(WriteRequest),
    /// A component's enabled checkbox changed
    ComponentToggled {
        component: ComponentId,
        enabled: bool,
    },
    SelectEntity(EntityId),
    ClearSelection,
    /// The refresh timer fired
    TickElapsed,
    /// A write came back from the engine
    WriteCompleted {
        request: WriteRequest,
        result: Result<AppliedWrite>,
    },
    SetRefreshInterval(Duration),
    SetAutoRefresh(bool),
    /// Refresh immediately, still subject to the editing skip
    RefreshNow,
    TogglePause,
    CheckConnection,
    ExportScene(PathBuf),
    ClearConsole,
}

/// One live inspector session against one engine
pub struct Session {
    api: Box<dyn EngineApi>,
    clock: Arc<dyn Clock>,
    store: SnapshotStore,
    tracker: EditTracker,
    debounce: DebounceCoalescer<FieldKey, WriteRequest>,
    reconcile: ReconcileLoop,
    pipeline: WritePipeline,
    console: Console,
    debounce_delay: Duration,
    refresh_stats: bool,
    /// Cached pause state of the engine; writes are only allowed while true
    paused: bool,
    connection: ConnectionStatus,
    engine_stats: Option<EngineStats>,
    outbox: Vec<SessionMessage>,
}

impl Session {
    pub fn new(config: &InspectorConfig, api: Box<dyn EngineApi>, clock: Arc<dyn Clock>) -> Self {
        let mut reconcile = ReconcileLoop::new(config.refresh.interval());
        if config.refresh.auto_refresh {
            reconcile.start(clock.now());
        }

        Self {
            api,
            store: SnapshotStore::new(),
            tracker: EditTracker::new(config.editing.grace()),
            debounce: DebounceCoalescer::new(),
            reconcile,
            pipeline: WritePipeline::new(config.editing.component_leniency),
            console: Console::new(config.console.capacity),
            debounce_delay: config.editing.debounce(),
            refresh_stats: config.refresh.refresh_stats,
            paused: false,
            connection: ConnectionStatus::Disconnected,
            engine_stats: None,
            outbox: Vec::new(),
            clock,
        }
    }

    /// Install the callback that receives every console entry
    pub fn set_log_sink(&mut self, sink: LogSink) {
        self.console.set_sink(sink);
    }

    /// Probe the engine, read its pause state and load the first snapshot
    pub fn start(&mut self) {
        tracing::info!("Live inspector session starting");
        self.check_connection();
        self.check_engine_status();
    }

    /// Process one event
    pub fn handle(&mut self, event: SessionEvent) {
        let now = self.clock.now();
        match event {
            SessionEvent::FieldFocused => self.tracker.begin_edit(),
            SessionEvent::FieldBlurred => self.tracker.end_edit(now),
            SessionEvent::FieldEdited(request) => match request.key() {
                Some(key) => {
                    self.debounce
                        .schedule(key, request, self.debounce_delay, now);
                }
                None => self.dispatch_write(request),
            },
            SessionEvent::FieldCommitted(request) => {
                if let Some(key) = request.key() {
                    self.debounce.cancel(&key);
                }
                self.dispatch_write(request);
            }
            SessionEvent::ComponentToggled { component, enabled } => {
                self.dispatch_write(WriteRequest::ComponentEnabled { component, enabled });
            }
            SessionEvent::SelectEntity(id) => self.select_entity(id),
            SessionEvent::ClearSelection => self.clear_selection(),
            SessionEvent::TickElapsed | SessionEvent::RefreshNow => self.refresh(now),
            SessionEvent::WriteCompleted { request, result } => {
                self.complete_write(request, result)
            }
            SessionEvent::SetRefreshInterval(interval) => self.set_refresh_interval(interval, now),
            SessionEvent::SetAutoRefresh(enabled) => self.set_auto_refresh(enabled, now),
            SessionEvent::TogglePause => self.toggle_pause(),
            SessionEvent::CheckConnection => {
                self.check_connection();
            }
            SessionEvent::ExportScene(path) => {
                let _ = self.export_scene(&path);
            }
            SessionEvent::ClearConsole => {
                let entry = self.console.clear();
                self.outbox.push(SessionMessage::Console(entry));
            }
        }
    }

    /// Fire every timer that has expired on the session clock
    pub fn pump(&mut self) {
        let now = self.clock.now();
        self.pump_at(now);
    }

    fn pump_at(&mut self, now: Instant) {
        self.tracker.poll(now);

        for (_, request) in self.debounce.take_due(now) {
            self.dispatch_write(request);
        }

        if self.reconcile.take_due(now) {
            self.handle(SessionEvent::TickElapsed);
        }
    }

    /// Earliest pending timer deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.tracker.next_deadline(),
            self.debounce.next_deadline(),
            self.reconcile.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Drain the messages produced since the last call
    pub fn take_messages(&mut self) -> Vec<SessionMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<Vec<Entity>> {
        self.store.snapshot()
    }

    pub fn selection(&self) -> Option<EntityId> {
        self.store.selection()
    }

    /// Whether writes are currently allowed
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_editing(&self) -> bool {
        self.tracker.is_editing(self.clock.now())
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn engine_stats(&self) -> Option<EngineStats> {
        self.engine_stats
    }

    pub fn api_stats(&self) -> ApiStats {
        self.api.stats_snapshot()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Fields with an edit still waiting in the debounce window
    pub fn pending_fields(&self) -> Vec<FieldKey> {
        let mut keys: Vec<FieldKey> = self.debounce.pending_keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn refresh_interval(&self) -> Duration {
        self.reconcile.interval()
    }

    pub fn auto_refresh(&self) -> bool {
        self.reconcile.is_running()
    }

    /// Fetch `/scene` and write it pretty-printed to `path`
    pub fn export_scene(&mut self, path: &Path) -> Result<()> {
        let result = self.write_scene(path);
        match &result {
            Ok(()) => {
                self.log(ConsoleLevel::Success, "Scene exported successfully");
                self.outbox
                    .push(SessionMessage::SceneExported(path.to_path_buf()));
            }
            Err(e) => self.log(ConsoleLevel::Error, format!("Error exporting scene: {}", e)),
        }
        result
    }

    fn write_scene(&mut self, path: &Path) -> Result<()> {
        let scene = self.api.scene_document()?;
        let text = serde_json::to_string_pretty(&scene)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn log(&mut self, level: ConsoleLevel, message: impl Into<String>) {
        let entry = self.console.push(level, message);
        self.outbox.push(SessionMessage::Console(entry));
    }

    fn set_connection(&mut self, status: ConnectionStatus) {
        if self.connection == status {
            return;
        }
        self.connection = status;
        match status {
            ConnectionStatus::Connected => self.log(ConsoleLevel::Success, "Connected to engine"),
            ConnectionStatus::Disconnected => {
                self.log(ConsoleLevel::Error, "Disconnected from engine")
            }
        }
        self.outbox.push(SessionMessage::ConnectionStatus(status));
    }

    /// Probe `/stats`; on success load the scene
    fn check_connection(&mut self) -> bool {
        match self.api.stats() {
            Ok(stats) => {
                self.set_connection(ConnectionStatus::Connected);
                self.publish_stats(stats);
                let now = self.clock.now();
                self.refresh_list(now);
                true
            }
            Err(e) => {
                tracing::warn!("Connection check failed: {}", e);
                self.set_connection(ConnectionStatus::Disconnected);
                false
            }
        }
    }

    fn check_engine_status(&mut self) {
        match self.api.engine_status() {
            Ok(status) => {
                self.paused = status.paused;
                self.outbox.push(SessionMessage::EnginePaused(self.paused));
            }
            Err(e) => tracing::warn!("Failed to check engine status: {}", e),
        }
    }

    fn publish_stats(&mut self, stats: EngineStats) {
        self.engine_stats = Some(stats);
        self.outbox.push(SessionMessage::Stats(stats));
    }

    fn refresh(&mut self, now: Instant) {
        self.refresh_list(now);
        if self.refresh_stats {
            match self.api.stats() {
                Ok(stats) => self.publish_stats(stats),
                Err(e) => tracing::debug!("Error updating stats: {}", e),
            }
        }
    }

    fn refresh_list(&mut self, now: Instant) {
        let editing = self.tracker.is_editing(now);
        let protected = self.pending_fields();
        let outcome = self
            .reconcile
            .tick(self.api.as_mut(), &mut self.store, editing, &protected);

        match outcome {
            TickOutcome::Applied {
                cleared_selection, ..
            } => {
                self.set_connection(ConnectionStatus::Connected);
                self.outbox
                    .push(SessionMessage::SnapshotReplaced(self.store.snapshot()));
                if cleared_selection.is_some() {
                    self.outbox.push(SessionMessage::SelectionChanged(None));
                    self.outbox.push(SessionMessage::ComponentsChanged(Vec::new()));
                    self.log(ConsoleLevel::Info, "Selection cleared");
                }
            }
            TickOutcome::FetchFailed(e) => {
                self.log(ConsoleLevel::Error, format!("Failed to load scene: {}", e));
                if matches!(e.root(), InspectorError::Network(_)) {
                    self.set_connection(ConnectionStatus::Disconnected);
                }
            }
            TickOutcome::SkippedEditing | TickOutcome::SkippedBusy => {}
        }
    }

    fn select_entity(&mut self, id: EntityId) {
        if let Err(e) = self.store.select(id) {
            self.log(ConsoleLevel::Warning, e.to_string());
            if self.store.clear_selection().is_some() {
                self.outbox.push(SessionMessage::SelectionChanged(None));
                self.outbox.push(SessionMessage::ComponentsChanged(Vec::new()));
            }
            return;
        }
        self.outbox.push(SessionMessage::SelectionChanged(Some(id)));
        self.log(ConsoleLevel::Info, format!("Selected actor: {}", id));
        self.load_details(id);
    }

    /// Load detail and components of the selected entity and tell the engine
    fn load_details(&mut self, id: EntityId) {
        let detail = match self.api.get_entity(id) {
            Ok(detail) => detail,
            Err(e) => {
                self.log(
                    ConsoleLevel::Error,
                    format!("Error loading actor details: {}", e),
                );
                return;
            }
        };
        if let Err(e) = self.api.notify_selection(id) {
            tracing::debug!("Failed to notify engine of selection {}: {}", id, e);
        }
        if self.store.set_detail(detail.clone()) {
            self.outbox.push(SessionMessage::DetailLoaded(detail));
        }

        match self.api.list_components(id) {
            Ok(components) => {
                if self.store.selection() == Some(id) {
                    self.store.set_components(components.clone());
                    self.outbox
                        .push(SessionMessage::ComponentsChanged(components));
                }
            }
            Err(e) => self.log(
                ConsoleLevel::Error,
                format!("Error loading components: {}", e),
            ),
        }
    }

    fn clear_selection(&mut self) {
        if self.store.clear_selection().is_none() {
            self.log(ConsoleLevel::Warning, "No actor selected");
            return;
        }
        self.outbox.push(SessionMessage::SelectionChanged(None));
        self.outbox.push(SessionMessage::ComponentsChanged(Vec::new()));
        self.log(ConsoleLevel::Info, "Selection cleared");
    }

    fn dispatch_write(&mut self, request: WriteRequest) {
        let result = self
            .pipeline
            .send(&request, self.paused, self.api.as_mut(), &self.store);
        self.handle(SessionEvent::WriteCompleted { request, result });
    }

    fn complete_write(&mut self, request: WriteRequest, result: Result<AppliedWrite>) {
        match result {
            Ok(applied) => {
                if let Err(e) = WritePipeline::apply(&mut self.store, &applied) {
                    tracing::debug!("Accepted write has no cached target: {}", e);
                }
                self.log(ConsoleLevel::Success, request.to_string());
                match applied {
                    AppliedWrite::Entity { .. } => {
                        self.outbox
                            .push(SessionMessage::SnapshotReplaced(self.store.snapshot()));
                        if let Some(detail) = self.store.detail().cloned() {
                            self.outbox.push(SessionMessage::DetailLoaded(detail));
                        }
                    }
                    AppliedWrite::ComponentProperty { .. } | AppliedWrite::ComponentEnabled { .. } => {
                        self.outbox.push(SessionMessage::ComponentsChanged(
                            self.store.components().to_vec(),
                        ));
                    }
                }
                self.outbox.push(SessionMessage::WriteCompleted {
                    request,
                    result: Ok(()),
                });
            }
            Err(e) => {
                let message = match (&request, e.is_gate_closed()) {
                    (WriteRequest::ComponentEnabled { .. }, true) => {
                        "Cannot toggle components while engine is running".to_string()
                    }
                    (_, true) => e.to_string(),
                    (WriteRequest::ComponentEnabled { .. }, false) => {
                        format!("Failed to toggle component: {}", e)
                    }
                    (_, false) => format!("Failed to update {}: {}", request.property(), e),
                };
                let level = if e.is_gate_closed() {
                    ConsoleLevel::Warning
                } else {
                    ConsoleLevel::Error
                };
                self.log(level, message);

                if let WriteRequest::ComponentEnabled { component, enabled } = request {
                    self.outbox.push(SessionMessage::ToggleReverted {
                        component,
                        enabled: !enabled,
                    });
                }
                self.outbox.push(SessionMessage::WriteCompleted {
                    request,
                    result: Err(e.to_string()),
                });
            }
        }
    }

    fn set_refresh_interval(&mut self, interval: Duration, now: Instant) {
        if interval.is_zero() {
            self.log(ConsoleLevel::Warning, "Refresh interval must be greater than zero");
            return;
        }
        self.reconcile.set_interval(interval, now);
        self.log(
            ConsoleLevel::Info,
            format!("Refresh interval set to {} ms", interval.as_millis()),
        );
    }

    fn set_auto_refresh(&mut self, enabled: bool, now: Instant) {
        if enabled == self.reconcile.is_running() {
            return;
        }
        if enabled {
            self.reconcile.start(now);
            self.log(ConsoleLevel::Info, "Auto-refresh enabled");
        } else {
            self.reconcile.stop();
            self.log(ConsoleLevel::Info, "Auto-refresh disabled");
        }
    }

    fn toggle_pause(&mut self) {
        let result = if self.paused {
            self.api.resume()
        } else {
            self.api.pause()
        };

        match result {
            Ok(()) => {
                self.paused = !self.paused;
                self.outbox.push(SessionMessage::EnginePaused(self.paused));
                let state = if self.paused { "paused" } else { "resumed" };
                self.log(ConsoleLevel::Info, format!("Engine {}", state));
                if let Some(id) = self.store.selection() {
                    self.load_details(id);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to toggle engine pause: {}", e);
                self.log(ConsoleLevel::Error, "Failed to toggle engine pause");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockEngine;
    use crate::sync::clock::ManualClock;
    use crate::types::{Axis, EntityField, PropertyPath, PropertyValue, TransformPart};

    fn session(engine: &MockEngine) -> (Session, ManualClock) {
        let clock = ManualClock::new();
        let config = InspectorConfig::default();
        let session = Session::new(&config, Box::new(engine.clone()), Arc::new(clock.clone()));
        (session, clock)
    }

    #[test]
    fn test_start_loads_scene_and_gate() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, _clock) = session(&engine);
        session.start();

        assert_eq!(session.connection(), ConnectionStatus::Connected);
        assert!(session.is_paused());
        assert_eq!(session.snapshot().len(), 3);

        let messages = session.take_messages();
        assert!(messages
            .iter()
            .any(|m| matches!(m, SessionMessage::EnginePaused(true))));
    }

    #[test]
    fn test_debounced_edits_send_last_value_once() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, clock) = session(&engine);
        session.start();
        engine.clear_calls();

        let edit = |value| {
            SessionEvent::FieldEdited(WriteRequest::TransformAxis {
                entity: 2,
                part: TransformPart::Position,
                axis: Axis::X,
                value,
            })
        };
        session.handle(edit(1.0));
        clock.advance_ms(50);
        session.handle(edit(2.0));
        clock.advance_ms(299);
        session.pump();
        assert!(engine.writes().is_empty());

        clock.advance_ms(1);
        session.pump();
        let writes = engine.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(engine.entity(2).unwrap().transform.position.x, 2.0);
    }

    #[test]
    fn test_commit_cancels_pending_debounce() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, clock) = session(&engine);
        session.start();

        let request = |value: &str| WriteRequest::EntityProperty {
            entity: 2,
            field: EntityField::Name,
            value: value.to_string(),
        };
        session.handle(SessionEvent::FieldEdited(request("Cu")));
        session.handle(SessionEvent::FieldCommitted(request("Cube 2")));
        clock.advance_ms(1000);
        session.pump();

        assert_eq!(engine.writes().len(), 1);
        assert_eq!(session.store().entity(2).unwrap().name, "Cube 2");
    }

    #[test]
    fn test_toggle_with_gate_closed_reverts() {
        let engine = MockEngine::sample();
        let (mut session, _clock) = session(&engine);
        session.start();
        session.handle(SessionEvent::SelectEntity(2));
        session.take_messages();

        session.handle(SessionEvent::ComponentToggled {
            component: 21,
            enabled: false,
        });

        assert!(engine.writes().is_empty());
        let messages = session.take_messages();
        assert!(messages.iter().any(|m| matches!(
            m,
            SessionMessage::ToggleReverted {
                component: 21,
                enabled: true
            }
        )));
        assert_eq!(
            session.console().last().unwrap().message,
            "Cannot toggle components while engine is running"
        );
    }

    #[test]
    fn test_pending_edit_survives_refresh() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, clock) = session(&engine);
        session.start();

        session.handle(SessionEvent::FieldEdited(WriteRequest::EntityProperty {
            entity: 2,
            field: EntityField::Name,
            value: "Local".into(),
        }));
        // Someone else renames the entity while our edit is still waiting
        let mut remote = engine.entity(2).unwrap();
        remote.name = "Remote".into();
        engine.insert_entity(remote);

        session.handle(SessionEvent::RefreshNow);
        assert_eq!(session.store().entity(2).unwrap().name, "Cube");

        clock.advance_ms(300);
        session.pump();
        assert_eq!(session.store().entity(2).unwrap().name, "Local");
    }

    #[test]
    fn test_toggle_pause_reloads_selection() {
        let engine = MockEngine::sample();
        let (mut session, _clock) = session(&engine);
        session.start();
        session.handle(SessionEvent::SelectEntity(3));
        engine.clear_calls();

        session.handle(SessionEvent::TogglePause);
        assert!(session.is_paused());
        assert!(engine.is_paused());

        let calls = engine.calls();
        assert!(calls.contains(&crate::backend::ApiCall::GetEntity(3)));
        assert!(calls.contains(&crate::backend::ApiCall::ListComponents(3)));
    }

    #[test]
    fn test_component_write_patches_nested_cache() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, _clock) = session(&engine);
        session.start();
        session.handle(SessionEvent::SelectEntity(2));

        session.handle(SessionEvent::FieldCommitted(WriteRequest::ComponentProperty {
            component: 20,
            path: PropertyPath::nested("color", "g"),
            value: 0.25.into(),
        }));

        let renderer = session.store().component(20).unwrap();
        assert_eq!(
            renderer.property(&PropertyPath::nested("color", "g")),
            Some(PropertyValue::Number(0.25))
        );
    }

    #[test]
    fn test_failed_select_clears_previous_selection() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, _clock) = session(&engine);
        session.start();
        session.handle(SessionEvent::SelectEntity(2));
        assert_eq!(session.store().components().len(), 2);
        session.take_messages();

        session.handle(SessionEvent::SelectEntity(99));

        assert_eq!(session.selection(), None);
        assert!(session.store().components().is_empty());
        assert!(session.store().detail().is_none());
        assert_eq!(session.console().last().unwrap().level, ConsoleLevel::Warning);

        let messages = session.take_messages();
        assert!(messages
            .iter()
            .any(|m| matches!(m, SessionMessage::SelectionChanged(None))));
        assert!(messages
            .iter()
            .any(|m| matches!(m, SessionMessage::ComponentsChanged(c) if c.is_empty())));
    }

    #[test]
    fn test_clear_selection_without_selection_warns() {
        let engine = MockEngine::sample();
        let (mut session, _clock) = session(&engine);
        session.handle(SessionEvent::ClearSelection);
        let last = session.console().last().unwrap();
        assert_eq!(last.level, ConsoleLevel::Warning);
        assert_eq!(last.message, "No actor selected");
    }

    #[test]
    fn test_next_deadline_tracks_earliest_timer() {
        let engine = MockEngine::sample().paused(true);
        let (mut session, clock) = session(&engine);
        let t0 = clock.now();
        assert_eq!(session.next_deadline(), Some(t0 + Duration::from_millis(2000)));

        session.handle(SessionEvent::FieldEdited(WriteRequest::TransformAxis {
            entity: 1,
            part: TransformPart::Scale,
            axis: Axis::Z,
            value: 3.0,
        }));
        assert_eq!(session.next_deadline(), Some(t0 + Duration::from_millis(300)));
    }
}
