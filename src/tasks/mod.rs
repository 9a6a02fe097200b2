//! # Task abstractions and decorators.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for implementing async units of deferred work
//! - [`TaskFn`] - function-based, ephemeral task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`SavableTask`] - facet for tasks that survive a restart
//! - [`CancelTask`] - decorator adding a terminal cancelled state and cleanup callbacks
//! - [`CaptureTask`] - decorator binding a serializable key instead of a live reference

mod cancel;
mod capture;
mod savable;
mod task;
mod task_fn;

pub use cancel::{CANCEL_KIND, CancelTask};
pub use capture::CaptureTask;
pub use savable::SavableTask;
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
