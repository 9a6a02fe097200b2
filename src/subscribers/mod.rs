//! Observability: the [`Subscribe`] trait and the fan-out that feeds it.
//!
//! Events published on the scheduler's [`Bus`](crate::events::Bus) reach
//! subscribers through one listener (spawned by
//! [`SchedulerBuilder`](crate::SchedulerBuilder)) and a [`SubscriberSet`]
//! that gives each subscriber a bounded queue and a worker of its own:
//!
//! ```text
//! TickedScheduler ──publish──► Bus ──listener──► SubscriberSet
//!                                                 ├─► LogWriter
//!                                                 ├─► metrics
//!                                                 └─► ...
//! ```
//!
//! [`LogWriter`] is a demo printer gated behind the `logging` feature; write
//! your own [`Subscribe`] implementation for anything real.

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
