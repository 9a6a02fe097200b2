//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable) together with
//! the common handle type [`TaskRef`], an `Arc<dyn Task>` suitable for
//! sharing between calling code and the scheduler (e.g. to keep a handle to a
//! [`CancelTask`](crate::CancelTask) that is already sitting in a bucket).
//!
//! A task receives a [`CancellationToken`] — the scheduler's runtime token —
//! and should check it to stop cooperatively during shutdown.
//!
//! ## Facets
//! Some tasks carry extra capabilities that the scheduler discovers through
//! facet hooks instead of downcasting:
//! - [`Task::as_savable`] — the task (including every decoration layer around
//!   it) can be externalized to a `(kind, payload)` record and reconstructed
//!   by a [`KindRegistry`](crate::KindRegistry) factory.
//! - [`Task::as_cancellable`] — the task is a [`CancelTask`](crate::CancelTask)
//!   and bucket cancellation should fire its cleanup callbacks instead of
//!   silently dropping it.
//!
//! Both hooks default to `None`; plain tasks never have to think about them.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::cancel::CancelTask;
use crate::tasks::savable::SavableTask;

/// Boxed future produced by task effects.
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// # Asynchronous, cancelable unit of deferred work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives a [`CancellationToken`]. The scheduler calls `run`
/// exactly once, on the tick the task was scheduled for.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use tickvisor::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Stable, human-readable name for events and logs.
    ///
    /// For durable leaf tasks the name doubles as the registry kind identity.
    fn name(&self) -> &str;

    /// Executes the task.
    ///
    /// Implementations should check `ctx.is_cancelled()` and exit quickly to
    /// honor shutdown. Rescheduling from inside `run` is allowed and always
    /// lands in a future tick bucket.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;

    /// Returns the savable facet, if this task — and every layer of
    /// decoration around it — can be externalized.
    ///
    /// The scheduler skips tasks without this facet when taking a snapshot.
    fn as_savable(&self) -> Option<&dyn SavableTask> {
        None
    }

    /// Returns the cancellable facet, if this task carries a terminal
    /// cancelled state with cleanup callbacks.
    ///
    /// Bucket cancellation fires `cancel()` on tasks exposing this facet and
    /// silently drops the rest.
    fn as_cancellable(&self) -> Option<&CancelTask> {
        None
    }
}

/// Shared handle to a task (`Arc<dyn Task>`).
pub type TaskRef = std::sync::Arc<dyn Task>;

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("dyn Task").field(&self.name()).finish()
    }
}
