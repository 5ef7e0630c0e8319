//! Mock construction helpers

use live_inspector::backend::MockEngine;
use live_inspector::config::InspectorConfig;
use live_inspector::sync::{ManualClock, Session};
use std::sync::Arc;

use super::builders::{ComponentBuilder, EntityBuilder};

/// Two-entity scene with a renderer on the cube
pub fn camera_and_cube() -> MockEngine {
    MockEngine::new()
        .with_entity(EntityBuilder::new(1, "Camera").tag("MainCamera").build())
        .with_entity(EntityBuilder::new(2, "Cube").position(0.0, 1.0, 0.0).build())
        .with_components(
            2,
            vec![
                ComponentBuilder::new(20, "Renderer")
                    .color(1.0, 1.0, 1.0)
                    .build(),
                ComponentBuilder::new(21, "RigidBody")
                    .property("mass", 1.0)
                    .property("useGravity", true)
                    .build(),
            ],
        )
}

/// A session over `engine` driven by a virtual clock
pub fn test_session(engine: &MockEngine) -> (Session, ManualClock) {
    test_session_with(engine, InspectorConfig::default())
}

pub fn test_session_with(engine: &MockEngine, config: InspectorConfig) -> (Session, ManualClock) {
    let clock = ManualClock::new();
    let session = Session::new(&config, Box::new(engine.clone()), Arc::new(clock.clone()));
    (session, clock)
}

/// A started session with the engine paused, so writes are allowed
pub fn started_paused_session(engine: &MockEngine) -> (Session, ManualClock) {
    engine.set_paused(true);
    let (mut session, clock) = test_session(engine);
    session.start();
    session.take_messages();
    engine.clear_calls();
    (session, clock)
}
