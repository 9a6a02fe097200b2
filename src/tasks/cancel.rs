//! # Cancellable decorator.
//!
//! [`CancelTask`] wraps an inner task with a terminal cancelled state and an
//! ordered chain of on-cancel cleanup callbacks.
//!
//! ## State machine
//! ```text
//! Active ──cancel()──► Cancelled (terminal)
//!
//! Active:    run() passes through to the inner task
//! Cancelled: run() is a no-op forever
//! ```
//!
//! ## Rules
//! - `cancel()` is idempotent: the false→true transition runs each on-cancel
//!   callback exactly once, in registration order; later calls are no-ops.
//! - Cancellation never interrupts an in-flight `run()`; it only prevents a
//!   not-yet-started run from doing anything.
//! - Callbacks registered after cancellation are dropped and never run.
//! - Callback errors are discarded; cleanup is best effort.
//!
//! ## Persistence
//! A `CancelTask` is savable iff the inner task and every callback are.
//! The payload persists the inner `(kind, data)`, each callback's
//! `(kind, data)`, and the cancelled flag, under the built-in kind identity
//! [`CANCEL_KIND`] that [`KindRegistry::new`](crate::KindRegistry::new)
//! pre-registers. Restoring a cancelled snapshot yields a task already in the
//! terminal state, without re-running callbacks — they already ran at the
//! moment of the original cancellation.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use tickvisor::{CancelTask, TaskError, TaskFn};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let work = TaskFn::arc("work", |_ctx| async { Ok::<_, TaskError>(()) });
//! let cleanup = TaskFn::arc("cleanup", |_ctx| async {
//!     println!("cleaning up");
//!     Ok::<_, TaskError>(())
//! });
//!
//! let task = CancelTask::arc(work);
//! task.on_cancel(cleanup);
//!
//! // keep a clone, hand the other to a scheduler...
//! task.cancel(CancellationToken::new()).await; // runs "cleanup" once
//! task.cancel(CancellationToken::new()).await; // no-op
//! # }
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{PersistError, TaskError};
use crate::persist::Payload;
use crate::tasks::savable::SavableTask;
use crate::tasks::task::{Task, TaskRef};

/// Built-in kind identity the cancellable decorator is registered under.
pub const CANCEL_KIND: &str = "cancel";

/// Cancellable wrapper around an inner task.
///
/// Keep an `Arc<CancelTask>` clone when scheduling one, so the pending copy
/// can still be cancelled while it sits in its tick bucket.
pub struct CancelTask {
    inner: TaskRef,
    cancelled: AtomicBool,
    on_cancel: Mutex<Vec<TaskRef>>,
}

impl CancelTask {
    /// Wraps `inner` in an active (not cancelled) decorator.
    pub fn new(inner: TaskRef) -> Self {
        Self {
            inner,
            cancelled: AtomicBool::new(false),
            on_cancel: Mutex::new(Vec::new()),
        }
    }

    /// Wraps `inner` and returns a shared handle.
    pub fn arc(inner: TaskRef) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::new(inner))
    }

    /// Reassembles a decorator from persisted parts.
    ///
    /// A `cancelled = true` snapshot comes back already terminal; its
    /// callbacks ran when the original was cancelled and are not re-run.
    pub(crate) fn from_parts(inner: TaskRef, on_cancel: Vec<TaskRef>, cancelled: bool) -> Self {
        Self {
            inner,
            cancelled: AtomicBool::new(cancelled),
            on_cancel: Mutex::new(on_cancel),
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::SeqCst)
    }

    /// Registers a cleanup callback to run when this task is cancelled.
    ///
    /// Callbacks run in registration order, exactly once, at the moment of
    /// the false→true transition. Registering after cancellation drops the
    /// callback silently.
    pub fn on_cancel(&self, task: TaskRef) {
        if self.is_cancelled() {
            return;
        }
        self.callbacks().push(task);
    }

    /// Transitions to the terminal cancelled state and runs the cleanup
    /// callbacks.
    ///
    /// Returns the number of callbacks fired: zero on every call after the
    /// first. `ctx` is forwarded to the callbacks; pass the scheduler's
    /// runtime token where one is available.
    pub async fn cancel(&self, ctx: CancellationToken) -> usize {
        if self.cancelled.swap(true, AtomicOrdering::SeqCst) {
            return 0;
        }
        let callbacks = std::mem::take(&mut *self.callbacks());
        let fired = callbacks.len();
        for cb in callbacks {
            let _ = cb.run(ctx.clone()).await;
        }
        fired
    }

    fn callbacks(&self) -> std::sync::MutexGuard<'_, Vec<TaskRef>> {
        self.on_cancel
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Task for CancelTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        if self.is_cancelled() {
            return Ok(());
        }
        self.inner.run(ctx).await
    }

    fn as_savable(&self) -> Option<&dyn SavableTask> {
        let inner_ok = self.inner.as_savable().is_some();
        let callbacks_ok = self
            .callbacks()
            .iter()
            .all(|cb| cb.as_savable().is_some());
        (inner_ok && callbacks_ok).then_some(self as &dyn SavableTask)
    }

    fn as_cancellable(&self) -> Option<&CancelTask> {
        Some(self)
    }
}

impl SavableTask for CancelTask {
    fn kind(&self) -> &str {
        CANCEL_KIND
    }

    fn save(&self) -> Result<Payload, PersistError> {
        let task = save_entry(&self.inner)?;
        let on_cancel = self
            .callbacks()
            .iter()
            .map(save_entry)
            .collect::<Result<Vec<Value>, PersistError>>()?;

        let mut data = Payload::new();
        data.insert("task".into(), task);
        data.insert("on_cancel".into(), Value::Array(on_cancel));
        data.insert("cancelled".into(), Value::Bool(self.is_cancelled()));
        Ok(data)
    }
}

/// Externalizes one nested task to a `{kind, data}` JSON entry.
fn save_entry(task: &TaskRef) -> Result<Value, PersistError> {
    let savable = task
        .as_savable()
        .ok_or_else(|| PersistError::Unsavable {
            kind: CANCEL_KIND.to_string(),
            detail: format!("nested task {:?} is ephemeral", task.name()),
        })?;
    let mut entry = Payload::new();
    entry.insert("kind".into(), savable.kind().into());
    entry.insert("data".into(), Value::Object(savable.save()?));
    Ok(Value::Object(entry))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::tasks::task_fn::TaskFn;

    fn counting_task(name: &'static str, hits: Arc<AtomicUsize>) -> TaskRef {
        TaskFn::arc(name, move |_ctx| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_run_passes_through_while_active() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = CancelTask::new(counting_task("work", hits.clone()));

        task.run(CancellationToken::new()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_is_noop_forever() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = CancelTask::new(counting_task("work", hits.clone()));

        task.cancel(CancellationToken::new()).await;
        task.run(CancellationToken::new()).await.unwrap();
        task.run(CancellationToken::new()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_fires_callbacks_once() {
        let cleaned = Arc::new(AtomicUsize::new(0));
        let task = CancelTask::new(TaskFn::arc("work", |_ctx| async { Ok::<_, TaskError>(()) }));
        task.on_cancel(counting_task("cleanup-a", cleaned.clone()));
        task.on_cancel(counting_task("cleanup-b", cleaned.clone()));

        assert_eq!(task.cancel(CancellationToken::new()).await, 2);
        assert_eq!(task.cancel(CancellationToken::new()).await, 0);
        assert_eq!(cleaned.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_callbacks_after_cancellation_never_run() {
        let cleaned = Arc::new(AtomicUsize::new(0));
        let task = CancelTask::new(TaskFn::arc("work", |_ctx| async { Ok::<_, TaskError>(()) }));

        task.cancel(CancellationToken::new()).await;
        task.on_cancel(counting_task("late", cleaned.clone()));
        task.cancel(CancellationToken::new()).await;
        assert_eq!(cleaned.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ephemeral_inner_blocks_savable_facet() {
        let task = CancelTask::new(TaskFn::arc("work", |_ctx| async { Ok::<_, TaskError>(()) }));
        assert!(task.as_savable().is_none());
    }
}
