//! # Example: basic_tick
//!
//! Minimal example of scheduling one-shot and looping work on a ticked
//! scheduler driven by a plain host loop.
//!
//! Demonstrates how to:
//! - Define tasks using [`TaskFn`].
//! - Schedule a one-shot with [`Schedule::schedule`].
//! - Expand a repeating schedule up front with [`Schedule::schedule_in_loop`].
//! - Drive everything with [`TickedScheduler::tick`].
//!
//! ## Flow
//! ```text
//! schedule(3, hello) ──► bucket[3]
//! schedule_in_loop(2, 2, 6, pulse) ──► buckets[2], [4], [6], [8]
//!
//! for tick in 1..=10:
//!     scheduler.tick()
//!       ├─ tick 2, 4, 6, 8 ─► "pulse"
//!       └─ tick 3          ─► "hello"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_tick
//! ```

use std::sync::Arc;

use tickvisor::{Config, Schedule, TaskError, TaskFn, TaskRef, TickedScheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the scheduler (defaults are fine here)
    let scheduler = Arc::new(TickedScheduler::new(Config::default()));

    // 2. A one-shot, three ticks out
    let hello: TaskRef = TaskFn::arc("hello", |_ctx| async move {
        println!("[hello] three ticks later");
        Ok::<_, TaskError>(())
    });
    scheduler.schedule(3, hello);

    // 3. A pulse every second tick between tick 2 and tick 8.
    //    The loop is expanded into individual firings up front, so
    //    pending_len() already counts all four.
    let pulse: TaskRef = TaskFn::arc("pulse", |_ctx| async move {
        println!("[pulse]");
        Ok::<_, TaskError>(())
    });
    scheduler.schedule_in_loop(2, 2, 6, pulse)?;
    println!("pending after setup: {}", scheduler.pending_len());

    // 4. The host's update loop drives the scheduler, one tick per step
    for step in 1..=10 {
        println!("-- tick {step}");
        scheduler.tick().await;
    }

    println!("pending after run: {}", scheduler.pending_len());
    Ok(())
}
