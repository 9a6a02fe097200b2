//! # The scheduler's event vocabulary.
//!
//! [`EventKind`] names everything worth observing: scheduling (single shots
//! and expanded loops), tick draining, bucket cancellation, the persistence
//! boundary (snapshots taken, records dropped on either side), and the
//! subscriber machinery's own diagnostics.
//!
//! [`Event`] is the envelope: a kind plus whichever of the optional fields
//! that kind carries, stamped with a wall-clock time and a process-global
//! monotonic `seq`. Consumers that receive events through independent queues
//! can sort by `seq` to recover the publish order.
//!
//! ## Example
//! ```rust
//! use tickvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("greeting")
//!     .with_tick(42)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("greeting"));
//! assert_eq!(ev.tick, Some(42));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Process-global sequence counter; every event draws the next value.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened. Doc comments list the optional fields each kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // --- subscriber machinery ---
    /// A subscriber's `on_event` panicked; the worker trapped it and moved
    /// on. Carries `task` (subscriber name) and `reason` (panic message).
    SubscriberPanicked,

    /// A subscriber's queue could not accept an event, which was dropped for
    /// that subscriber only. Carries `task` (subscriber name) and `reason`
    /// (`"full"` or `"closed"`).
    SubscriberOverflow,

    // --- scheduling ---
    /// A task was placed into a future bucket. Carries `task`, `tick` (the
    /// absolute tick it will run at) and `delay` (as requested).
    TaskScheduled,

    /// A repeating registration was expanded into individual firings up
    /// front. Carries `task`, `count` (number of firings) and `delay` (the
    /// first one).
    LoopScheduled,

    // --- tick draining ---
    /// The counter moved forward by one. Carries `tick` (now current) and
    /// `count` (tasks due at it).
    TickAdvanced,

    /// A due task ran to completion. Carries `task` and `tick`.
    TaskStopped,

    /// A due task returned an error; the rest of its batch still ran.
    /// Carries `task`, `tick` and `reason`.
    TaskFailed,

    /// A due task panicked and the panic was trapped; the rest of its batch
    /// still ran. Carries `task`, `tick` and `reason`.
    TaskPanicked,

    // --- cancellation ---
    /// A whole bucket was removed before its tick arrived. Carries `tick`
    /// and `count` (tasks removed with it).
    BucketCancelled,

    /// A cancellable task reached its terminal state and its cleanup chain
    /// ran. Carries `task` and `count` (callbacks fired).
    TaskCancelled,

    // --- persistence boundary ---
    /// Pending tasks were externalized. Carries `tick` (delays in the
    /// records are relative to it) and `count` (records written).
    SnapshotTaken,

    /// A savable task failed to externalize and was left out; the rest of
    /// the snapshot proceeded. Carries `task` and `reason`.
    SnapshotSkipped,

    /// A record was reconstructed and rescheduled. Carries `task` (the kind
    /// identity) and `delay`.
    TaskRestored,

    /// A record failed to reconstruct — unknown kind, malformed payload, or
    /// a nested task that no longer deserializes — and was dropped; the rest
    /// of the batch still loaded. Carries `task` (the kind identity) and
    /// `reason`.
    RestoreFailed,
}

/// One announcement from the scheduler.
///
/// `seq` and `at` are always stamped; the remaining fields are filled per
/// [`EventKind`] through the `with_*` builders.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-global, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock time the event was created.
    pub at: SystemTime,
    /// What happened.
    pub kind: EventKind,

    /// Task name — or subscriber name, for the subscriber kinds.
    pub task: Option<Arc<str>>,
    /// Absolute tick number.
    pub tick: Option<u64>,
    /// Relative delay in ticks.
    pub delay: Option<u64>,
    /// How many items were affected (tasks in a bucket, records written, ...).
    pub count: Option<usize>,
    /// Why it happened, for the failure kinds.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Stamps a fresh event of the given kind; optional fields start empty.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: NEXT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            tick: None,
            delay: None,
            count: None,
            reason: None,
        }
    }

    /// Sets the task (or subscriber) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Sets the absolute tick number.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Sets the relative delay in ticks.
    #[inline]
    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the affected-item count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the failure reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TickAdvanced);
        let b = Event::new(EventKind::TickAdvanced);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_only_their_fields() {
        let ev = Event::new(EventKind::RestoreFailed)
            .with_task("greeting")
            .with_delay(3)
            .with_reason("unknown kind");
        assert_eq!(ev.task.as_deref(), Some("greeting"));
        assert_eq!(ev.delay, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("unknown kind"));
        assert_eq!(ev.tick, None);
        assert_eq!(ev.count, None);
    }
}
