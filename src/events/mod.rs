//! The event data model and the broadcast bus it travels on.
//!
//! [`TickedScheduler`](crate::TickedScheduler) publishes an [`Event`] for
//! every observable operation — work registered, ticks drained, buckets
//! cancelled, snapshots taken or restored. The [`Bus`] carries them to the
//! listener that [`SchedulerBuilder`](crate::SchedulerBuilder) wires up, and
//! from there to the subscribers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
