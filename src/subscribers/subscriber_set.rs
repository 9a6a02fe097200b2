//! # Fan-out from the event bus to subscriber workers.
//!
//! [`SubscriberSet`] takes the single event stream the builder's listener
//! receives and distributes it to every registered [`Subscribe`]
//! implementation. Each subscriber gets its own bounded queue and its own
//! worker, so the set gives three isolation guarantees:
//!
//! - delivery never blocks the listener (`try_send` only),
//! - a full queue loses the event for that subscriber alone, announced as
//!   [`EventKind::SubscriberOverflow`],
//! - a panicking `on_event` is trapped in the worker and announced as
//!   [`EventKind::SubscriberPanicked`]; the worker keeps draining.
//!
//! There is no ordering guarantee *across* subscribers — one may be several
//! events ahead of another — but each individual subscriber sees its events
//! in publish order.
//!
//! Trapping uses `AssertUnwindSafe`; a subscriber that panics while holding
//! its own lock can poison its own state, not the scheduler's.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Send side of one subscriber's queue, kept for delivery and diagnostics.
struct Outbox {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Owns the per-subscriber queues and worker tasks.
///
/// Built once by [`SchedulerBuilder`](crate::SchedulerBuilder) when
/// subscribers are attached; hosts that run their own listener can construct
/// one directly and feed it with [`emit_arc`](SubscriberSet::emit_arc).
pub struct SubscriberSet {
    outboxes: Vec<Outbox>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one queue + worker pair per subscriber.
    ///
    /// Queue capacity comes from [`Subscribe::queue_capacity`], raised to at
    /// least 1. Workers run until their queue is closed (see
    /// [`shutdown`](SubscriberSet::shutdown)). Must be called inside a Tokio
    /// runtime.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut set = Self {
            outboxes: Vec::with_capacity(subscribers.len()),
            workers: Vec::with_capacity(subscribers.len()),
            bus,
        };
        for subscriber in subscribers {
            set.attach(subscriber);
        }
        set
    }

    fn attach(&mut self, subscriber: Arc<dyn Subscribe>) {
        let (tx, rx) = mpsc::channel(subscriber.queue_capacity().max(1));
        self.outboxes.push(Outbox {
            name: subscriber.name(),
            tx,
        });
        self.workers
            .push(tokio::spawn(drain(subscriber, rx, self.bus.clone())));
    }

    /// Returns the number of attached subscribers.
    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    /// Returns true if no subscribers are attached.
    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }

    /// Delivers one event to every subscriber queue.
    ///
    /// Clones the event into an `Arc` first; prefer
    /// [`emit_arc`](SubscriberSet::emit_arc) when the caller already holds one.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Delivers a shared event to every subscriber queue without blocking.
    ///
    /// A queue that is full (or whose worker is gone) loses this event, and a
    /// `SubscriberOverflow` naming the subscriber goes back onto the bus —
    /// unless the event being delivered *is* an overflow report, which is
    /// never re-reported, so a permanently-full queue cannot feed itself.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let reportable = event.kind != EventKind::SubscriberOverflow;

        for outbox in &self.outboxes {
            let verdict = match outbox.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            if reportable {
                self.bus.publish(
                    Event::new(EventKind::SubscriberOverflow)
                        .with_task(outbox.name)
                        .with_reason(verdict),
                );
            }
        }
    }

    /// Closes every queue and waits for the workers to finish draining.
    pub async fn shutdown(self) {
        drop(self.outboxes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Worker loop: feed queued events to one subscriber, trapping its panics.
async fn drain(subscriber: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(event) = rx.recv().await {
        let call = std::panic::AssertUnwindSafe(subscriber.on_event(&event)).catch_unwind();
        if let Err(payload) = call.await {
            bus.publish(
                Event::new(EventKind::SubscriberPanicked)
                    .with_task(subscriber.name())
                    .with_reason(panic_message(&*payload)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct Counter {
        hits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Grumpy;

    #[async_trait]
    impl Subscribe for Grumpy {
        async fn on_event(&self, _event: &Event) {
            panic!("no events please");
        }

        fn name(&self) -> &'static str {
            "grumpy"
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_event() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let subscribers: Vec<Arc<dyn Subscribe>> = vec![
            Arc::new(Counter { hits: first.clone() }),
            Arc::new(Counter { hits: second.clone() }),
        ];
        let set = SubscriberSet::new(subscribers, Bus::new(16));
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::TickAdvanced));
        set.emit(&Event::new(EventKind::TickAdvanced));
        set.shutdown().await;

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_starve_the_rest() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let hits = Arc::new(AtomicUsize::new(0));
        let subscribers: Vec<Arc<dyn Subscribe>> =
            vec![Arc::new(Grumpy), Arc::new(Counter { hits: hits.clone() })];
        let set = SubscriberSet::new(subscribers, bus);

        set.emit(&Event::new(EventKind::TickAdvanced));
        set.shutdown().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let mut trapped = false;
        while let Ok(ev) = rx.try_recv() {
            trapped |= ev.kind == EventKind::SubscriberPanicked;
        }
        assert!(trapped, "the panic must surface as an event");
    }
}
