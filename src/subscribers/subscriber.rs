//! # The subscriber extension point.
//!
//! Implement [`Subscribe`] to observe what a scheduler is doing — work being
//! registered, buckets drained or removed, snapshots taken and restored —
//! without touching the scheduling path itself. Attach implementations with
//! [`SchedulerBuilder::with_subscribers`](crate::SchedulerBuilder::with_subscribers).
//!
//! Each implementation is serviced by a dedicated worker behind a bounded
//! queue (see [`SubscriberSet`](crate::SubscriberSet)), so a slow handler
//! backs up only its own queue and a panicking one is trapped and reported
//! instead of unwinding into the scheduler.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! use async_trait::async_trait;
//! use tickvisor::{Event, EventKind, Subscribe};
//!
//! /// Counts records that failed to come back from a snapshot.
//! struct RestoreAudit {
//!     dropped: Arc<AtomicU64>,
//! }
//!
//! #[async_trait]
//! impl Subscribe for RestoreAudit {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::RestoreFailed {
//!             self.dropped.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "restore-audit"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of the scheduler's event stream.
///
/// Handlers run on a worker owned by the
/// [`SubscriberSet`](crate::SubscriberSet), never inline with `tick()` or
/// `schedule()`. Within one subscriber, events arrive in publish order.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Keep it non-blocking (async I/O only) and swallow errors internally; a
    /// panic here is trapped by the worker and published as
    /// `EventKind::SubscriberPanicked`.
    async fn on_event(&self, event: &Event);

    /// Short identifier used in overflow and panic reports.
    ///
    /// Defaults to `type_name::<Self>()`, which is long-winded — override
    /// with something like `"metrics"` or `"restore-audit"`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// How many undelivered events this subscriber's queue may hold.
    ///
    /// When the queue is full the next event is dropped for this subscriber
    /// only and a `SubscriberOverflow` is published in its place. Clamped to
    /// at least 1. Defaults to 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
