//! # Broadcast bus for scheduler events.
//!
//! Every observable thing a scheduler does — registering work, advancing a
//! tick, removing a bucket, taking or restoring a snapshot — is announced as
//! an [`Event`] here. The bus is a thin veneer over
//! [`tokio::sync::broadcast`]: publishing never waits, delivery is
//! fire-and-forget, and each receiver owns an independent cursor into one
//! shared ring buffer.
//!
//! [`SchedulerBuilder`](crate::SchedulerBuilder) wires a single receiver (the
//! listener feeding the [`SubscriberSet`](crate::SubscriberSet)); tests
//! subscribe directly and assert on the kinds they drain.
//!
//! Losing events is acceptable by design: the stream is diagnostics, not
//! state. A receiver that falls more than `capacity` events behind observes
//! `RecvError::Lagged(n)` on its next `recv()` and resumes from the oldest
//! event still retained.

use tokio::sync::broadcast;

use super::event::Event;

/// Handle to a scheduler's broadcast channel.
///
/// Cloning is cheap (the sender is reference-counted), so the scheduler, the
/// builder's listener and the subscriber workers all share one channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer retains up to `capacity` events.
    ///
    /// A capacity below 1 is raised to 1; the underlying channel rejects zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event without blocking.
    ///
    /// With no live receivers the event is simply discarded.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens an independent receiver positioned after everything already sent.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
