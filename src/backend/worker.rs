//! Session Worker Thread Implementation
//!
//! This module contains the loop that runs the [`Session`] in its own thread.
//! It communicates with the UI thread through crossbeam channels.
//!
//! # Responsibilities
//!
//! The worker thread handles:
//!
//! - **Command processing**: turns UI commands into session events
//! - **Timers**: pumps the session so debounced writes, the editing grace
//!   period and the refresh loop fire on time
//! - **Message forwarding**: moves session output onto the UI channel,
//!   dropping and counting status messages if the UI falls behind; write
//!   results and toggle reverts wait for room instead
//!
//! # Timing
//!
//! The worker sleeps a fixed granularity between iterations, shortened when a
//! session timer is due sooner. Gateway calls block the worker, never the UI.

use crate::backend::{EngineApi, SessionCommand, SessionMessage};
use crate::config::InspectorConfig;
use crate::sync::{Clock, Session, SessionEvent};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Longest the worker sleeps between iterations
pub const POLL_GRANULARITY: Duration = Duration::from_millis(10);

impl SessionCommand {
    /// The session event this command maps to; `None` for worker-level commands
    pub fn into_event(self) -> Option<SessionEvent> {
        Some(match self {
            SessionCommand::FieldFocused => SessionEvent::FieldFocused,
            SessionCommand::FieldBlurred => SessionEvent::FieldBlurred,
            SessionCommand::EditField(request) => SessionEvent::FieldEdited(request),
            SessionCommand::CommitField(request) => SessionEvent::FieldCommitted(request),
            SessionCommand::ToggleComponent { component, enabled } => {
                SessionEvent::ComponentToggled { component, enabled }
            }
            SessionCommand::Select(id) => SessionEvent::SelectEntity(id),
            SessionCommand::ClearSelection => SessionEvent::ClearSelection,
            SessionCommand::SetRefreshInterval(interval) => {
                SessionEvent::SetRefreshInterval(interval)
            }
            SessionCommand::SetAutoRefresh(enabled) => SessionEvent::SetAutoRefresh(enabled),
            SessionCommand::RefreshNow => SessionEvent::RefreshNow,
            SessionCommand::TogglePause => SessionEvent::TogglePause,
            SessionCommand::CheckConnection => SessionEvent::CheckConnection,
            SessionCommand::ExportScene(path) => SessionEvent::ExportScene(path),
            SessionCommand::ClearConsole => SessionEvent::ClearConsole,
            SessionCommand::RequestStats | SessionCommand::Shutdown => return None,
        })
    }
}

/// The worker that drives one session
pub struct SessionWorker {
    /// The session actor
    session: Session,
    /// Clock shared with the session
    clock: Arc<dyn Clock>,
    /// Command receiver from the UI
    command_rx: Receiver<SessionCommand>,
    /// Message sender to the UI
    message_tx: Sender<SessionMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Messages dropped because the UI queue was full
    dropped_messages: u64,
}

impl SessionWorker {
    /// Create a new session worker
    pub fn new(
        config: &InspectorConfig,
        api: Box<dyn EngineApi>,
        clock: Arc<dyn Clock>,
        command_rx: Receiver<SessionCommand>,
        message_tx: Sender<SessionMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            session: Session::new(config, api, Arc::clone(&clock)),
            clock,
            command_rx,
            message_tx,
            running,
            dropped_messages: 0,
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Session worker started");
        self.session.start();
        self.forward_messages();

        while self.running.load(Ordering::SeqCst) {
            self.step();
            self.idle_sleep();
        }

        let _ = self.message_tx.send(SessionMessage::Shutdown);
        tracing::info!(
            "Session worker stopped ({} messages dropped)",
            self.dropped_messages
        );
    }

    /// One iteration: commands, timers, then output
    pub fn step(&mut self) {
        self.process_commands();
        self.session.pump();
        self.forward_messages();
    }

    /// The session this worker drives
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
            SessionCommand::RequestStats => {
                self.send_stats();
            }
            other => {
                if let Some(event) = other.into_event() {
                    self.session.handle(event);
                }
            }
        }
    }

    /// Sleep until the next session timer, at most one granularity
    fn idle_sleep(&self) {
        let sleep = match self.session.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(self.clock.now())
                .min(POLL_GRANULARITY),
            None => POLL_GRANULARITY,
        };
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }

    /// Send statistics to UI
    fn send_stats(&mut self) {
        if let Some(stats) = self.session.engine_stats() {
            self.try_send_message(SessionMessage::Stats(stats));
        }
        let api_stats = self.session.api_stats();
        self.try_send_message(SessionMessage::ApiStats(api_stats));
    }

    fn forward_messages(&mut self) {
        for msg in self.session.take_messages() {
            self.try_send_message(msg);
        }
    }

    /// Try to send a message, tracking dropped messages if queue is full
    ///
    /// Messages the UI must act on block until there is room.
    fn try_send_message(&mut self, msg: SessionMessage) {
        let sent = if msg.must_deliver() {
            self.message_tx.send(msg).is_ok()
        } else {
            self.message_tx.try_send(msg).is_ok()
        };
        if !sent {
            self.dropped_messages += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockEngine;
    use crate::sync::ManualClock;
    use crate::sync::WriteRequest;
    use crate::types::{Axis, TransformPart};
    use crossbeam_channel::bounded;

    fn create_test_worker(
        engine: &MockEngine,
    ) -> (
        SessionWorker,
        Receiver<SessionMessage>,
        Sender<SessionCommand>,
        ManualClock,
    ) {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (msg_tx, msg_rx) = bounded(256);
        let running = Arc::new(AtomicBool::new(true));
        let clock = ManualClock::new();
        let config = InspectorConfig::default();

        let worker = SessionWorker::new(
            &config,
            Box::new(engine.clone()),
            Arc::new(clock.clone()),
            cmd_rx,
            msg_tx,
            running,
        );

        (worker, msg_rx, cmd_tx, clock)
    }

    #[test]
    fn test_shutdown_command() {
        let engine = MockEngine::sample();
        let (mut worker, _, cmd_tx, _) = create_test_worker(&engine);

        cmd_tx.send(SessionCommand::Shutdown).unwrap();
        worker.process_commands();

        assert!(!worker.running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_disconnected_channel_stops_worker() {
        let engine = MockEngine::sample();
        let (mut worker, _, cmd_tx, _) = create_test_worker(&engine);

        drop(cmd_tx);
        worker.process_commands();
        assert!(!worker.running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_step_fires_debounced_write() {
        let engine = MockEngine::sample().paused(true);
        let (mut worker, msg_rx, cmd_tx, clock) = create_test_worker(&engine);
        worker.session.start();

        cmd_tx
            .send(SessionCommand::EditField(WriteRequest::TransformAxis {
                entity: 1,
                part: TransformPart::Rotation,
                axis: Axis::Y,
                value: 45.0,
            }))
            .unwrap();
        worker.step();
        assert!(engine.writes().is_empty());

        clock.advance_ms(300);
        worker.step();
        assert_eq!(engine.writes().len(), 1);

        let completed = msg_rx
            .try_iter()
            .any(|m| matches!(m, SessionMessage::WriteCompleted { result: Ok(()), .. }));
        assert!(completed);
    }

    #[test]
    fn test_request_stats() {
        let engine = MockEngine::sample();
        let (mut worker, msg_rx, cmd_tx, _) = create_test_worker(&engine);
        worker.session.start();
        while msg_rx.try_recv().is_ok() {}

        cmd_tx.send(SessionCommand::RequestStats).unwrap();
        worker.process_commands();

        let messages: Vec<SessionMessage> = msg_rx.try_iter().collect();
        assert!(messages
            .iter()
            .any(|m| matches!(m, SessionMessage::Stats(s) if s.actor_count == 3)));
        assert!(messages
            .iter()
            .any(|m| matches!(m, SessionMessage::ApiStats(_))));
    }

    #[test]
    fn test_full_queue_counts_drops() {
        let engine = MockEngine::sample();
        let (cmd_tx, cmd_rx) = bounded(4);
        let (msg_tx, _msg_rx) = bounded(1);
        let mut worker = SessionWorker::new(
            &InspectorConfig::default(),
            Box::new(engine),
            Arc::new(ManualClock::new()),
            cmd_rx,
            msg_tx,
            Arc::new(AtomicBool::new(true)),
        );
        drop(cmd_tx);

        worker.session.start();
        worker.forward_messages();
        assert!(worker.dropped_messages() > 0);
    }

    #[test]
    fn test_full_queue_still_delivers_toggle_revert() {
        let engine = MockEngine::sample();
        let (_cmd_tx, cmd_rx) = bounded(4);
        let (msg_tx, msg_rx) = bounded(1);
        let mut worker = SessionWorker::new(
            &InspectorConfig::default(),
            Box::new(engine),
            Arc::new(ManualClock::new()),
            cmd_rx,
            msg_tx,
            Arc::new(AtomicBool::new(true)),
        );

        worker.try_send_message(SessionMessage::EnginePaused(true));
        let ui = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            msg_rx.iter().take(2).collect::<Vec<_>>()
        });

        // Queue is full; a status message is dropped, the revert waits
        worker.try_send_message(SessionMessage::EnginePaused(false));
        assert_eq!(worker.dropped_messages(), 1);
        worker.try_send_message(SessionMessage::ToggleReverted {
            component: 21,
            enabled: true,
        });

        let received = ui.join().unwrap();
        assert!(matches!(received[0], SessionMessage::EnginePaused(true)));
        assert!(matches!(
            received[1],
            SessionMessage::ToggleReverted {
                component: 21,
                enabled: true
            }
        ));
        assert_eq!(worker.dropped_messages(), 1);
    }
}
