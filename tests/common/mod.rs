//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use live_inspector::backend::{InspectorHandle, SessionMessage};
use std::time::{Duration, Instant};

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Drain messages from a live backend until one matches or the timeout passes
///
/// Returns every message seen, including the match.
pub fn wait_for<F>(handle: &InspectorHandle, timeout: Duration, mut pred: F) -> Vec<SessionMessage>
where
    F: FnMut(&SessionMessage) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        if let Ok(msg) = handle.receiver.recv_timeout(Duration::from_millis(10)) {
            let hit = pred(&msg);
            seen.push(msg);
            if hit {
                return seen;
            }
        }
    }
    panic!("timed out waiting for message; saw {:?}", seen);
}
