//! # Scheduler builder.
//!
//! [`SchedulerBuilder`] constructs a shared [`TickedScheduler`] and wires the
//! event pipeline: a listener subscribes to the scheduler's bus and fans
//! events out to the provided subscribers through a
//! [`SubscriberSet`](crate::SubscriberSet).

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::config::Config;
use crate::core::ticked::TickedScheduler;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a scheduler with optional subscribers.
pub struct SchedulerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive scheduler events (scheduling, tick draining,
    /// cancellation, snapshot/restore) through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the scheduler.
    ///
    /// When subscribers were provided this spawns the fan-out listener, so it
    /// must be called inside a Tokio runtime; a subscriber-less scheduler can
    /// be built anywhere.
    pub fn build(self) -> Arc<TickedScheduler> {
        let scheduler = Arc::new(TickedScheduler::new(self.cfg));

        if !self.subscribers.is_empty() {
            let bus = scheduler.bus().clone();
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let mut rx = bus.subscribe();

            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => set.emit_arc(Arc::new(ev)),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });
        }
        scheduler
    }
}
