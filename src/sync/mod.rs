//! Synchronization engine
//!
//! Keeps a periodically refreshed projection of the remote scene consistent
//! with the user's in-flight edits.
//!
//! # Components
//!
//! - [`EditTracker`] - whether an input is focused, with a grace window after blur
//! - [`DebounceCoalescer`] - per-field timers collapsing bursts of edits
//! - [`SnapshotStore`] - cached entity list, selection, detail and components
//! - [`ReconcileLoop`] - periodic re-fetch and merge
//! - [`WritePipeline`] - gated, validated writes with a local patch on success
//! - [`Session`] - the single owner of all of the above
//!
//! All timers compare against a [`Clock`], so tests drive them with a
//! [`ManualClock`] instead of sleeping.

pub mod clock;
pub mod debounce;
pub mod edit_tracker;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod write_pipeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::DebounceCoalescer;
pub use edit_tracker::EditTracker;
pub use reconcile::{LoopState, ReconcileLoop, TickOutcome};
pub use session::{Session, SessionEvent};
pub use snapshot::{EntityPatch, SnapshotStore};
pub use write_pipeline::{AppliedWrite, WritePipeline, WriteRequest};
