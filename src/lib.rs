//! # tickvisor
//!
//! **Tickvisor** is a tick-synchronized, persistence-aware task scheduler for
//! game runtimes.
//!
//! It lets surrounding game logic say "run this unit of work N discrete
//! time-steps from now", survive serialization across a process restart, and
//! safely re-bind captured external references (a particular world, a
//! particular player) that may no longer exist when the work finally runs.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │  CancelTask  │   │ CaptureTask  │
//!     │ (plain work) │   │ (+ cleanup)  │   │ (key-bound)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TickedScheduler                                                  │
//! │  - tick-indexed bucket map (tick number → FIFO queue of tasks)    │
//! │  - Bus (broadcast events)                                         │
//! │  - runtime CancellationToken (handed to every run)                │
//! └──────┬──────────────────────────┬─────────────────────────┬──────┘
//!        │ tick()                   │ snapshot()/restore()     │
//!        ▼                          ▼                          ▼
//!   host update loop         KindRegistry              SubscriberSet
//!   (once per time step)     (kind → factory)          (LogWriter, ...)
//! ```
//!
//! ### Lifecycle
//! ```text
//! build task ──► (optionally decorate) ──► schedule(delay, task)
//!
//! tick():
//!   ├─► current += 1
//!   ├─► detach bucket for the now-current tick
//!   └─► run each task in insertion order
//!         ├─ Ok      ─► TaskStopped
//!         ├─ Err     ─► TaskFailed   (batch continues)
//!         ├─ panic   ─► TaskPanicked (trapped; batch continues)
//!         └─ task may schedule() again ─► lands in a future bucket
//!
//! on save:   snapshot(registry) ─► [{kind, relative delay, payload}, ...]
//! on load:   restore(records, registry)
//!              ├─ factory found    ─► scheduled at recorded delay
//!              └─ unknown/broken   ─► RestoreFailed, record dropped,
//!                                     rest of the batch still loads
//! ```
//!
//! ## Features
//! | Area              | Description                                                             | Key types / traits                        |
//! |-------------------|-------------------------------------------------------------------------|-------------------------------------------|
//! | **Scheduling**    | Tick-bucket scheduling, precomputed loops, per-session instances.       | [`Schedule`], [`TickedScheduler`]         |
//! | **Tasks**         | Define tasks as trait impls or closures, share as `Arc<dyn Task>`.      | [`Task`], [`TaskFn`], [`TaskRef`]         |
//! | **Decorators**    | Terminal cancellation with cleanup; key-bound capture of live entities. | [`CancelTask`], [`CaptureTask`]           |
//! | **Persistence**   | Kind registry, savable facet, relative-delay records.                   | [`KindRegistry`], [`SavableTask`], [`TaskRecord`] |
//! | **Subscriber API**| Hook into scheduler events (logging, metrics, custom subscribers).      | [`Subscribe`]                             |
//! | **Errors**        | Typed errors for scheduling, task bodies and persistence.               | [`ScheduleError`], [`TaskError`], [`PersistError`] |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] event printer, meant for
//!   demos rather than production logging.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tickvisor::{Config, Schedule, TaskError, TaskFn, TaskRef, TickedScheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let scheduler = Arc::new(TickedScheduler::new(Config::default()));
//!
//!     // Run once, three ticks from now.
//!     let hello: TaskRef = TaskFn::arc("hello", |_ctx| async move {
//!         println!("three ticks later");
//!         Ok::<_, TaskError>(())
//!     });
//!     scheduler.schedule(3, hello);
//!
//!     // Every second tick between tick 2 and tick 8, expanded up front.
//!     let pulse: TaskRef = TaskFn::arc("pulse", |_ctx| async move {
//!         println!("pulse");
//!         Ok::<_, TaskError>(())
//!     });
//!     scheduler.schedule_in_loop(2, 2, 6, pulse).expect("interval > 0");
//!
//!     // The host's update loop drives everything.
//!     for _ in 0..10 {
//!         scheduler.tick().await;
//!     }
//! }
//! ```

mod core;
mod error;
mod events;
mod persist;
mod subscribers;
mod tasks;

pub use crate::core::{
    Config, Schedule, SchedulerBuilder, TickedScheduler, default_scheduler, init_default,
};
pub use error::{PersistError, ScheduleError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use persist::{KindRegistry, Payload, TaskFactory, TaskRecord};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    BoxTaskFuture, CANCEL_KIND, CancelTask, CaptureTask, SavableTask, Task, TaskFn, TaskRef,
};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
