//! Reconciliation loop
//!
//! Periodically re-fetches the entity list and merges it into the
//! [`SnapshotStore`]. A tick is skipped entirely while the user is editing;
//! a failed fetch leaves the previous snapshot in place. The loop never
//! refetches the detail or components of a surviving selection, which would
//! make the inspector jump under the user.

use super::snapshot::SnapshotStore;
use crate::backend::EngineApi;
use crate::error::InspectorError;
use crate::types::{EntityId, FieldKey};
use std::time::{Duration, Instant};

/// Whether a fetch is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Fetching,
}

/// Result of one tick
#[derive(Debug)]
pub enum TickOutcome {
    /// The user was editing; nothing was fetched
    SkippedEditing,
    /// A previous fetch had not finished
    SkippedBusy,
    /// The list could not be fetched; the snapshot is unchanged
    FetchFailed(InspectorError),
    /// The snapshot was replaced
    Applied {
        entity_count: usize,
        /// Selection that vanished from the fresh list and was cleared
        cleared_selection: Option<EntityId>,
    },
}

impl TickOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, TickOutcome::Applied { .. })
    }
}

/// Timer and merge policy for periodic refreshes
#[derive(Debug, Clone)]
pub struct ReconcileLoop {
    interval: Duration,
    next_tick: Option<Instant>,
    state: LoopState,
    ticks: u64,
    skipped: u64,
    failures: u64,
}

impl ReconcileLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
            state: LoopState::Idle,
            ticks: 0,
            skipped: 0,
            failures: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Arm the timer; a running loop is restarted from `now`
    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
        tracing::debug!("Auto-refresh armed every {:?}", self.interval);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// Change the interval, restarting the timer if it was running
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        let was_running = self.is_running();
        self.stop();
        self.interval = interval;
        if was_running {
            self.start(now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Whether the timer has expired; re-arms it when it has
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(deadline) if now >= deadline => {
                self.next_tick = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Run one refresh against `api`, merging into `store`
    ///
    /// `protected` lists fields with an edit still waiting to be sent; their
    /// cached values survive the merge.
    pub fn tick(
        &mut self,
        api: &mut dyn EngineApi,
        store: &mut SnapshotStore,
        editing: bool,
        protected: &[FieldKey],
    ) -> TickOutcome {
        self.ticks += 1;

        if editing {
            self.skipped += 1;
            tracing::debug!("Skipping refresh - user is editing");
            return TickOutcome::SkippedEditing;
        }
        if self.state == LoopState::Fetching {
            self.skipped += 1;
            return TickOutcome::SkippedBusy;
        }

        self.state = LoopState::Fetching;
        let fetched = api.list_entities();
        self.state = LoopState::Idle;

        let entities = match fetched {
            Ok(entities) => entities,
            Err(e) => {
                self.failures += 1;
                tracing::warn!("Failed to load scene: {}", e);
                return TickOutcome::FetchFailed(e);
            }
        };

        let entity_count = entities.len();
        store.replace_preserving(entities, protected);

        let cleared_selection = if store.selection_is_live() {
            None
        } else {
            store.clear_selection()
        };

        TickOutcome::Applied {
            entity_count,
            cleared_selection,
        }
    }

    /// (ticks, skipped, failed)
    pub fn counters(&self) -> (u64, u64, u64) {
        (self.ticks, self.skipped, self.failures)
    }
}
