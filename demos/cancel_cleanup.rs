//! # Example: cancel_cleanup
//!
//! Demonstrates the cancellable decorator: a terminal cancelled state with
//! cleanup callbacks that fire exactly once.
//!
//! Shows how to:
//! - Wrap work in a [`CancelTask`] and keep a handle to it.
//! - Register on-cancel callbacks with [`CancelTask::on_cancel`].
//! - Cancel a whole tick bucket with [`TickedScheduler::cancel`], which fires
//!   callbacks for cancellable tasks and silently drops plain ones.
//!
//! ## Flow
//! ```text
//! schedule(3, cancellable(greet) + cleanup)
//! schedule(3, plain)
//!
//! tick()                      ── tick 1, nothing due
//! cancel(2)                   ── removes bucket[3]
//!   ├─ cancellable ─► cancel() ─► "cleanup" runs now
//!   └─ plain       ─► dropped silently
//! tick(), tick()              ── nothing left to run
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_cleanup
//! ```

use std::sync::Arc;

use tickvisor::{CancelTask, Config, Schedule, TaskError, TaskFn, TickedScheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let scheduler = Arc::new(TickedScheduler::new(Config::default()));

    // 1. Cancellable work with a cleanup chain
    let greet = TaskFn::arc("greet", |_ctx| async move {
        println!("[greet] should never run");
        Ok::<_, TaskError>(())
    });
    let cancellable = CancelTask::arc(greet);
    cancellable.on_cancel(TaskFn::arc("cleanup", |_ctx| async move {
        println!("[cleanup] fired at cancellation time");
        Ok::<_, TaskError>(())
    }));

    // 2. Keep the handle; schedule a clone alongside a plain task
    scheduler.schedule(3, cancellable.clone());
    scheduler.schedule(3, TaskFn::arc("plain", |_ctx| async move {
        println!("[plain] should never run either");
        Ok::<_, TaskError>(())
    }));

    // 3. One tick in, the bucket sits two ticks ahead; remove it
    scheduler.tick().await;
    let removed = scheduler.cancel(2).await;
    println!("removed {removed} tasks; cancelled={}", cancellable.is_cancelled());

    // 4. Nothing is left to run
    scheduler.tick().await;
    scheduler.tick().await;
    println!("pending: {}", scheduler.pending_len());
}
