//! # Closure-backed tasks.
//!
//! [`TaskFn`] turns any `Fn(CancellationToken) -> Future` closure into a
//! [`Task`]. The closure is invoked once per run and hands back a brand-new
//! future, so nothing leaks between runs; when runs do need shared state,
//! move an explicit `Arc` into the closure.
//!
//! A `TaskFn` is ephemeral by design: it never exposes the savable facet, so
//! snapshots skip it silently. Work that must survive a restart belongs in a
//! [`SavableTask`](crate::SavableTask) implementation with a registered kind.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use tickvisor::{TaskError, TaskFn, TaskRef};
//!
//! let beep: TaskRef = TaskFn::arc("beep", |ctx: CancellationToken| async move {
//!     if !ctx.is_cancelled() {
//!         println!("beep");
//!     }
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(beep.name(), "beep");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Task whose work lives in a stored closure.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Wraps `f` under the given name.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Wraps `f` and returns it ready to hand to a scheduler as a
    /// [`TaskRef`](crate::TaskRef).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
