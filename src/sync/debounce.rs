//! Debounce coalescer
//!
//! Keyed, cancellable timers. Scheduling under a key that already has a live
//! timer replaces both its deadline and its action, so a burst of edits to
//! one field sends only the last value once the field has been quiet for the
//! debounce delay. Actions are plain data; the caller executes whatever
//! [`DebounceCoalescer::take_due`] hands back.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<A> {
    deadline: Instant,
    /// Monotonic sequence so equal deadlines fire in scheduling order
    seq: u64,
    action: A,
}

/// At most one pending action per key
#[derive(Debug, Clone)]
pub struct DebounceCoalescer<K, A> {
    pending: HashMap<K, Pending<A>>,
    next_seq: u64,
    superseded: u64,
}

impl<K, A> Default for DebounceCoalescer<K, A> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            next_seq: 0,
            superseded: 0,
        }
    }
}

impl<K: Eq + Hash + Clone, A> DebounceCoalescer<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `key`, discarding any action already pending under it
    ///
    /// Returns the discarded action, if there was one.
    pub fn schedule(&mut self, key: K, action: A, delay: Duration, now: Instant) -> Option<A> {
        let seq = self.next_seq;
        self.next_seq += 1;
        let previous = self.pending.insert(
            key,
            Pending {
                deadline: now + delay,
                seq,
                action,
            },
        );
        if previous.is_some() {
            self.superseded += 1;
        }
        previous.map(|p| p.action)
    }

    /// Drop the timer for `key` without running it
    pub fn cancel(&mut self, key: &K) -> Option<A> {
        self.pending.remove(key).map(|p| p.action)
    }

    /// Remove and return every action whose deadline has passed, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, A)> {
        let due_keys: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();

        let mut due: Vec<(K, Pending<A>)> = due_keys
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p)))
            .collect();
        due.sort_by_key(|(_, p)| (p.deadline, p.seq));
        due.into_iter().map(|(k, p)| (k, p.action)).collect()
    }

    /// Whether a timer is live for `key`
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// The action currently waiting under `key`
    pub fn pending_action(&self, key: &K) -> Option<&A> {
        self.pending.get(key).map(|p| &p.action)
    }

    /// Keys with a live timer
    pub fn pending_keys(&self) -> impl Iterator<Item = &K> {
        self.pending.keys()
    }

    /// Earliest deadline among live timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// How many scheduled actions were replaced before firing
    pub fn superseded_count(&self) -> u64 {
        self.superseded
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
