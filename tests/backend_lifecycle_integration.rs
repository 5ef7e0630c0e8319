//! Integration tests for backend lifecycle
//!
//! These tests run the real worker thread over the in-memory engine:
//! - Startup connection and initial snapshot
//! - Command round trips through the channels
//! - Shutdown via command and via the stop handle

mod common;

use common::mock_helpers::camera_and_cube;
use common::{test_timeout, wait_for};
use live_inspector::backend::{InspectorBackend, MockEngine, SessionCommand, SessionMessage};
use live_inspector::config::InspectorConfig;
use live_inspector::sync::{SystemClock, WriteRequest};
use live_inspector::types::{ConnectionStatus, EntityField};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn spawn(engine: &MockEngine) -> (thread::JoinHandle<()>, live_inspector::InspectorHandle) {
    let (backend, handle) = InspectorBackend::new(
        InspectorConfig::default(),
        Box::new(engine.clone()),
        Arc::new(SystemClock),
    );
    (thread::spawn(move || backend.run()), handle)
}

#[test]
fn test_backend_creation_and_shutdown() {
    let engine = camera_and_cube();
    let (thread, handle) = spawn(&engine);

    handle.shutdown();

    wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::Shutdown)
    });
    let result = thread.join();
    assert!(result.is_ok(), "Backend thread should exit cleanly");
}

#[test]
fn test_startup_reports_connection_and_snapshot() {
    let engine = camera_and_cube();
    let (thread, handle) = spawn(&engine);

    let seen = wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::SnapshotReplaced(list) if list.len() == 2)
    });
    assert!(seen
        .iter()
        .any(|m| matches!(m, SessionMessage::ConnectionStatus(ConnectionStatus::Connected))));

    handle.shutdown();
    thread.join().unwrap();
}

#[test]
fn test_offline_engine_reports_disconnected() {
    let engine = camera_and_cube();
    let (thread, handle) = spawn(&engine);
    wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::ConnectionStatus(ConnectionStatus::Connected))
    });

    engine.set_offline(true);
    assert!(handle.send_command(SessionCommand::CheckConnection));
    wait_for(&handle, test_timeout(), |m| {
        matches!(
            m,
            SessionMessage::ConnectionStatus(ConnectionStatus::Disconnected)
        )
    });

    handle.shutdown();
    thread.join().unwrap();
}

#[test]
fn test_write_round_trip_through_worker() {
    let engine = camera_and_cube().paused(true);
    let (thread, handle) = spawn(&engine);
    wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::EnginePaused(true))
    });

    handle.commit_field(WriteRequest::EntityProperty {
        entity: 2,
        field: EntityField::Name,
        value: "Crate".into(),
    });

    wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::WriteCompleted { result: Ok(()), .. })
    });
    assert_eq!(engine.entity(2).unwrap().name, "Crate");

    handle.shutdown();
    thread.join().unwrap();
}

#[test]
fn test_selection_loads_components() {
    let engine = camera_and_cube();
    let (thread, handle) = spawn(&engine);

    handle.select(2);
    let seen = wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::ComponentsChanged(c) if c.len() == 2)
    });
    assert!(seen
        .iter()
        .any(|m| matches!(m, SessionMessage::DetailLoaded(e) if e.id == 2)));

    handle.shutdown();
    thread.join().unwrap();
}

#[test]
fn test_request_stats_answers_both_counters() {
    let engine = camera_and_cube();
    let (thread, handle) = spawn(&engine);

    assert!(handle.send_command(SessionCommand::RequestStats));
    wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::ApiStats(_))
    });

    handle.shutdown();
    thread.join().unwrap();
}

#[test]
fn test_stop_handle_ends_loop() {
    let engine = camera_and_cube();
    let (backend, handle) = InspectorBackend::new(
        InspectorConfig::default(),
        Box::new(engine.clone()),
        Arc::new(SystemClock),
    );
    let stop = backend.stop_handle();
    let thread = thread::spawn(move || backend.run());

    thread::sleep(Duration::from_millis(50));
    stop.store(false, Ordering::SeqCst);

    wait_for(&handle, test_timeout(), |m| {
        matches!(m, SessionMessage::Shutdown)
    });
    thread.join().unwrap();
}

#[test]
fn test_dropped_handle_stops_worker() {
    let engine = camera_and_cube();
    let (thread, handle) = spawn(&engine);
    drop(handle);

    // Worker notices the closed command channel and exits
    thread.join().unwrap();
}
