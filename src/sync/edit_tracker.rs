//! Edit session tracking
//!
//! Focus leaves a field before the field's final change is delivered. The
//! tracker therefore keeps the editing flag raised for a grace period after
//! [`EditTracker::end_edit`], so the trailing commit is still processed while
//! refreshes are suppressed.

use std::time::{Duration, Instant};

/// Whether the user is currently editing a field
#[derive(Debug, Clone)]
pub struct EditTracker {
    editing: bool,
    clear_at: Option<Instant>,
    grace: Duration,
}

impl EditTracker {
    pub fn new(grace: Duration) -> Self {
        Self {
            editing: false,
            clear_at: None,
            grace,
        }
    }

    /// A field gained focus; cancels any pending clear
    pub fn begin_edit(&mut self) {
        if !self.editing {
            tracing::debug!("Started editing");
        }
        self.editing = true;
        self.clear_at = None;
    }

    /// A field lost focus; the flag drops once the grace period has passed
    pub fn end_edit(&mut self, now: Instant) {
        self.poll(now);
        if self.editing {
            self.clear_at = Some(now + self.grace);
        }
    }

    /// Whether refresh logic must hold off at `now`
    pub fn is_editing(&self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) => self.editing && now < deadline,
            None => self.editing,
        }
    }

    /// Apply an expired clear; returns true if the flag dropped
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if now >= deadline => {
                self.editing = false;
                self.clear_at = None;
                tracing::debug!("Stopped editing");
                true
            }
            _ => false,
        }
    }

    /// When the pending clear fires, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.clear_at
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }
}
