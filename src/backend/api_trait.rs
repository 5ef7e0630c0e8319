//! EngineApi trait for a unified gateway interface
//!
//! This module provides the common trait for everything that can answer the
//! engine's JSON API: the real HTTP client and the in-memory mock engine used
//! in tests and `--mock` mode.

use crate::error::Result;
use crate::types::{
    Component, ComponentId, Entity, EntityId, EngineStats, EngineStatus, PropertyValue,
    Transform, WriteAck,
};
use std::collections::VecDeque;

/// Size of the rolling window for recent request times
const RECENT_WINDOW_SIZE: usize = 100;

/// Statistics for gateway requests
#[derive(Debug, Clone)]
pub struct ApiStats {
    /// Total number of requests that produced a response
    pub successful_requests: u64,
    /// Total number of requests that failed at the transport level
    pub failed_requests: u64,
    /// Total request time in microseconds
    pub total_request_time_us: u64,
    /// Last request time in microseconds
    pub last_request_time_us: u64,
    /// Rolling window of recent request times
    pub recent_request_times: VecDeque<u64>,
}

impl Default for ApiStats {
    fn default() -> Self {
        Self {
            successful_requests: 0,
            failed_requests: 0,
            total_request_time_us: 0,
            last_request_time_us: 0,
            recent_request_times: VecDeque::with_capacity(RECENT_WINDOW_SIZE),
        }
    }
}

impl ApiStats {
    /// Calculate average request time in microseconds
    pub fn avg_request_time_us(&self) -> f64 {
        if self.successful_requests == 0 {
            0.0
        } else {
            self.total_request_time_us as f64 / self.successful_requests as f64
        }
    }

    /// Calculate success rate as percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.successful_requests + self.failed_requests;
        if total == 0 {
            100.0
        } else {
            (self.successful_requests as f64 / total as f64) * 100.0
        }
    }

    /// Record a completed request
    pub fn record_success(&mut self, time_us: u64) {
        self.successful_requests += 1;
        self.total_request_time_us += time_us;
        self.last_request_time_us = time_us;

        self.recent_request_times.push_back(time_us);
        if self.recent_request_times.len() > RECENT_WINDOW_SIZE {
            self.recent_request_times.pop_front();
        }
    }

    /// Record a failed request
    pub fn record_failure(&mut self) {
        self.failed_requests += 1;
    }

    /// Get the recent max request time (from rolling window)
    pub fn recent_max_us(&self) -> u64 {
        self.recent_request_times.iter().max().copied().unwrap_or(0)
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Request/response interface to the engine process
///
/// Every method is one round trip. Implementations hold no scene state of
/// their own; caching is the session's job. Write endpoints return the
/// engine's raw [`WriteAck`] so the caller decides how strictly to read it.
#[cfg_attr(test, mockall::automock)]
pub trait EngineApi: Send {
    /// `GET /stats`
    fn stats(&mut self) -> Result<EngineStats>;

    /// `GET /actors`
    fn list_entities(&mut self) -> Result<Vec<Entity>>;

    /// `GET /actors/{id}`
    fn get_entity(&mut self, id: EntityId) -> Result<Entity>;

    /// `GET /editor/select/{id}`
    fn notify_selection(&mut self, id: EntityId) -> Result<()>;

    /// `POST /actors/{id}/property`
    fn set_entity_property(&mut self, id: EntityId, property: &str, value: &str)
        -> Result<WriteAck>;

    /// `POST /actors/{id}/transform` with the full transform
    fn set_transform(&mut self, id: EntityId, transform: &Transform) -> Result<WriteAck>;

    /// `GET /actors/{id}/components`
    fn list_components(&mut self, id: EntityId) -> Result<Vec<Component>>;

    /// `POST /components/{id}/property`
    fn set_component_property(
        &mut self,
        id: ComponentId,
        property: &str,
        value: &PropertyValue,
    ) -> Result<WriteAck>;

    /// `POST /components/{id}/enabled`
    fn set_component_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<WriteAck>;

    /// `GET /engine/status`
    fn engine_status(&mut self) -> Result<EngineStatus>;

    /// `POST /engine/pause`
    fn pause(&mut self) -> Result<()>;

    /// `POST /engine/resume`
    fn resume(&mut self) -> Result<()>;

    /// `GET /scene`
    fn scene_document(&mut self) -> Result<serde_json::Value>;

    /// Gateway request statistics
    fn stats_snapshot(&self) -> ApiStats {
        ApiStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_average_and_rate() {
        let mut stats = ApiStats::default();
        assert_eq!(stats.success_rate(), 100.0);

        stats.record_success(100);
        stats.record_success(300);
        stats.record_failure();

        assert_eq!(stats.avg_request_time_us(), 200.0);
        assert_eq!(stats.last_request_time_us, 300);
        assert_eq!(stats.recent_max_us(), 300);
        assert!((stats.success_rate() - 66.666).abs() < 0.01);

        stats.reset();
        assert_eq!(stats.successful_requests, 0);
    }

    #[test]
    fn test_rolling_window_bounded() {
        let mut stats = ApiStats::default();
        for i in 0..(RECENT_WINDOW_SIZE as u64 + 20) {
            stats.record_success(i);
        }
        assert_eq!(stats.recent_request_times.len(), RECENT_WINDOW_SIZE);
    }
}
