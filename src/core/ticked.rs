//! # Tick-bucket scheduler.
//!
//! [`TickedScheduler`] owns a tick-indexed multi-map from future tick number
//! to the FIFO queue of tasks due at that tick, and advances one tick at a
//! time as the host's update loop drives it.
//!
//! ## Architecture
//! ```text
//! schedule(delay, task) ──► buckets[current + max(delay, 1)].push_back(task)
//!
//! tick():
//!   current += 1
//!   batch = buckets.remove(current)      (detached under the lock)
//!   for task in batch:                   (lock released)
//!       task.run(runtime_token)          ─► Err/panic published, batch continues
//!                └─ may call schedule() again: lands in a future bucket
//!
//! cancel(delta):
//!   batch = buckets.remove(current + delta)
//!   cancellable tasks ─► cancel() fires cleanup callbacks
//!   plain tasks       ─► dropped silently
//!
//! snapshot(registry) ─► [{kind, delay = bucket_tick - current, data}, ...]
//! restore(records)   ─► schedule(record.delay, factory-built task)
//! ```
//!
//! ## Rules
//! - Buckets live in a hash map keyed by absolute tick (gaps between
//!   scheduled ticks can be arbitrarily large), so insert/lookup/remove stay
//!   O(1) amortized.
//! - Draining is destructive: the batch is detached before running, so a task
//!   rescheduling itself can never be run twice within one `tick()`.
//! - The state mutex is held only for map mutation, never across an await;
//!   reentrant `schedule` calls from task bodies are safe by construction.
//! - All mutation is expected from one logical thread (the host's update
//!   loop); the mutex exists so schedulers can be shared as `Arc` and stored
//!   in process-wide statics, not for parallel ticking.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::builder::SchedulerBuilder;
use crate::core::config::Config;
use crate::core::schedule::{Schedule, loop_offsets};
use crate::error::{ScheduleError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::persist::{KindRegistry, TaskRecord};
use crate::tasks::TaskRef;

/// Mutable scheduler state: the tick counter and the bucket map.
struct TickState {
    current: u64,
    buckets: HashMap<u64, VecDeque<TaskRef>>,
}

/// Tick-synchronized task scheduler.
///
/// Driven by exactly one external entry point, [`tick`](TickedScheduler::tick),
/// which the host calls once per discrete time step. Scheduling, cancellation
/// and persistence all key off the internal monotonically increasing tick
/// counter.
///
/// ## Example
/// ```rust
/// use tickvisor::{Config, Schedule, TaskError, TaskFn, TickedScheduler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler = TickedScheduler::new(Config::default());
///
/// scheduler.schedule(3, TaskFn::arc("greet", |_ctx| async {
///     println!("three ticks later");
///     Ok::<_, TaskError>(())
/// }));
///
/// for _ in 0..3 {
///     scheduler.tick().await; // "greet" runs on the third advance
/// }
/// # }
/// ```
pub struct TickedScheduler {
    state: Mutex<TickState>,
    bus: Bus,
    token: CancellationToken,
    trap_panics: bool,
}

impl TickedScheduler {
    /// Creates a scheduler from the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            state: Mutex::new(TickState {
                current: cfg.start_tick,
                buckets: HashMap::new(),
            }),
            bus: Bus::new(cfg.bus_capacity_clamped()),
            token: CancellationToken::new(),
            trap_panics: cfg.trap_panics,
        }
    }

    /// Returns a builder that can attach event subscribers.
    pub fn builder(cfg: Config) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    /// Returns the event bus this scheduler publishes to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns a clone of the runtime token handed to every task `run`.
    ///
    /// Cancelling it asks in-flight and future task bodies to stop
    /// cooperatively; it does not remove anything from the buckets.
    pub fn runtime_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns the current tick counter.
    pub fn current_tick(&self) -> u64 {
        self.lock_state().current
    }

    /// Returns the number of pending tasks across all buckets.
    pub fn pending_len(&self) -> usize {
        self.lock_state().buckets.values().map(VecDeque::len).sum()
    }

    /// Returns true if no tasks are pending.
    pub fn is_empty(&self) -> bool {
        self.lock_state().buckets.is_empty()
    }

    /// Advances the tick counter by one and runs every task due at the
    /// now-current tick, in insertion order.
    ///
    /// The due bucket is detached before any task runs: a task rescheduling
    /// itself (even with delay 0) lands in a future bucket and cannot recurse
    /// into the same tick. One failing or panicking task is published as an
    /// event and the rest of the batch still runs.
    pub async fn tick(&self) {
        let (now, batch) = {
            let mut state = self.lock_state();
            state.current += 1;
            let current = state.current;
            let batch = state.buckets.remove(&current).unwrap_or_default();
            (current, batch)
        };

        self.bus.publish(
            Event::new(EventKind::TickAdvanced)
                .with_tick(now)
                .with_count(batch.len()),
        );

        for task in batch {
            self.run_one(task, now).await;
        }
    }

    /// Removes the bucket at `current + delta` without running its tasks.
    ///
    /// Tasks exposing the cancellable facet get `cancel()` invoked, so their
    /// cleanup callbacks fire immediately; plain tasks are dropped silently.
    /// Returns the number of tasks removed.
    pub async fn cancel(&self, delta: u64) -> usize {
        let (tick, batch) = {
            let mut state = self.lock_state();
            let tick = state.current.saturating_add(delta);
            (tick, state.buckets.remove(&tick))
        };
        let Some(batch) = batch else { return 0 };

        self.bus.publish(
            Event::new(EventKind::BucketCancelled)
                .with_tick(tick)
                .with_count(batch.len()),
        );
        let removed = batch.len();
        for task in &batch {
            self.cancel_one(task).await;
        }
        removed
    }

    /// Cancels every pending bucket, in tick order.
    ///
    /// Returns the total number of tasks removed.
    pub async fn cancel_all(&self) -> usize {
        let buckets = {
            let mut state = self.lock_state();
            std::mem::take(&mut state.buckets)
        };

        let mut drained: Vec<(u64, VecDeque<TaskRef>)> = buckets.into_iter().collect();
        drained.sort_unstable_by_key(|(tick, _)| *tick);

        let mut removed = 0;
        for (tick, batch) in drained {
            self.bus.publish(
                Event::new(EventKind::BucketCancelled)
                    .with_tick(tick)
                    .with_count(batch.len()),
            );
            removed += batch.len();
            for task in &batch {
                self.cancel_one(task).await;
            }
        }
        removed
    }

    /// Externalizes every still-pending savable task to records whose delays
    /// are relative to the current tick.
    ///
    /// Buckets are walked in tick order and tasks in insertion order, so a
    /// restore preserves same-tick FIFO. Ephemeral tasks are skipped
    /// silently; a savable task that fails to externalize is dropped with a
    /// `SnapshotSkipped` event and the rest of the snapshot proceeds.
    pub fn snapshot(&self, registry: &KindRegistry) -> Vec<TaskRecord> {
        let (current, pending) = {
            let state = self.lock_state();
            let mut pending: Vec<(u64, Vec<TaskRef>)> = state
                .buckets
                .iter()
                .map(|(tick, queue)| (*tick, queue.iter().cloned().collect()))
                .collect();
            pending.sort_unstable_by_key(|(tick, _)| *tick);
            (state.current, pending)
        };

        let mut records = Vec::new();
        for (tick, tasks) in pending {
            let delay = tick - current;
            for task in tasks {
                match registry.save(&task) {
                    Ok(None) => {}
                    Ok(Some((kind, data))) => {
                        records.push(TaskRecord::new(kind, delay, data));
                    }
                    Err(err) => {
                        self.bus.publish(
                            Event::new(EventKind::SnapshotSkipped)
                                .with_task(task.name())
                                .with_reason(err.as_message()),
                        );
                    }
                }
            }
        }

        self.bus.publish(
            Event::new(EventKind::SnapshotTaken)
                .with_tick(current)
                .with_count(records.len()),
        );
        records
    }

    /// Reconstructs records through the registry and schedules each at its
    /// recorded relative delay.
    ///
    /// A record that fails (unknown kind, malformed payload, or a nested task
    /// that no longer deserializes) is dropped with a `RestoreFailed` event;
    /// all other records still load. Returns the number of tasks scheduled.
    pub fn restore(&self, records: Vec<TaskRecord>, registry: &KindRegistry) -> usize {
        let mut loaded = 0;
        for record in records {
            match registry.restore(&record.kind, &record.data) {
                Ok(task) => {
                    self.bus.publish(
                        Event::new(EventKind::TaskRestored)
                            .with_task(record.kind.as_str())
                            .with_delay(record.delay),
                    );
                    self.schedule(record.delay, task);
                    loaded += 1;
                }
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::RestoreFailed)
                            .with_task(record.kind.as_str())
                            .with_reason(err.as_message()),
                    );
                }
            }
        }
        loaded
    }

    /// Runs one due task, isolating its failure from the rest of the batch.
    async fn run_one(&self, task: TaskRef, now: u64) {
        let name: Arc<str> = Arc::from(task.name());

        if self.trap_panics {
            let fut = task.run(self.token.clone());
            match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(())) => {
                    self.bus.publish(
                        Event::new(EventKind::TaskStopped)
                            .with_task(name)
                            .with_tick(now),
                    );
                }
                Ok(Err(err)) => {
                    self.bus.publish(
                        Event::new(EventKind::TaskFailed)
                            .with_task(name)
                            .with_tick(now)
                            .with_reason(err.as_message()),
                    );
                }
                Err(payload) => {
                    self.bus.publish(
                        Event::new(EventKind::TaskPanicked)
                            .with_task(name)
                            .with_tick(now)
                            .with_reason(panic_message(&*payload)),
                    );
                }
            }
        } else {
            match task.run(self.token.clone()).await {
                Ok(()) => {
                    self.bus.publish(
                        Event::new(EventKind::TaskStopped)
                            .with_task(name)
                            .with_tick(now),
                    );
                }
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::TaskFailed)
                            .with_task(name)
                            .with_tick(now)
                            .with_reason(err.as_message()),
                    );
                }
            }
        }
    }

    /// Fires the cancellable facet of a removed task, if it has one.
    async fn cancel_one(&self, task: &TaskRef) {
        if let Some(cancellable) = task.as_cancellable() {
            if cancellable.is_cancelled() {
                return;
            }
            let name: Arc<str> = Arc::from(task.name());
            let fired = cancellable.cancel(self.token.clone()).await;
            self.bus.publish(
                Event::new(EventKind::TaskCancelled)
                    .with_task(name)
                    .with_count(fired),
            );
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TickState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Schedule for TickedScheduler {
    /// Buckets the task at `current + delay` ticks, clamping a zero delay to
    /// one: "run at the next tick advance", never synchronously.
    fn schedule(&self, delay: u64, task: TaskRef) {
        let name: Arc<str> = Arc::from(task.name());
        let due = {
            let mut state = self.lock_state();
            let due = state.current.saturating_add(delay.max(1));
            state.buckets.entry(due).or_default().push_back(task);
            due
        };
        self.bus.publish(
            Event::new(EventKind::TaskScheduled)
                .with_task(name)
                .with_tick(due)
                .with_delay(delay),
        );
    }

    fn schedule_in_loop(
        &self,
        delay: u64,
        interval: u64,
        duration: u64,
        task: TaskRef,
    ) -> Result<(), ScheduleError> {
        let offsets = loop_offsets(delay, interval, duration)?;
        self.bus.publish(
            Event::new(EventKind::LoopScheduled)
                .with_task(task.name())
                .with_count(offsets.len())
                .with_delay(delay),
        );
        for offset in offsets {
            self.schedule(offset, task.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex as StdMutex, OnceLock};

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::broadcast;

    use super::*;
    use crate::error::{PersistError, TaskError};
    use crate::persist::Payload;
    use crate::tasks::{CancelTask, SavableTask, Task, TaskFn};

    fn scheduler() -> TickedScheduler {
        TickedScheduler::new(Config::default())
    }

    fn hit_task(name: &'static str, hits: Arc<AtomicUsize>) -> TaskRef {
        TaskFn::arc(name, move |_ctx| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        })
    }

    fn log_task(name: &'static str, log: Arc<StdMutex<Vec<String>>>) -> TaskRef {
        TaskFn::arc(name, move |_ctx| {
            let log = log.clone();
            async move {
                log.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(name.to_string());
                Ok::<_, TaskError>(())
            }
        })
    }

    fn drain_kinds(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    /// Durable test task: appends its text to a shared log when run.
    struct Note {
        text: String,
        log: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl Task for Note {
        fn name(&self) -> &str {
            "note"
        }

        async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(self.text.clone());
            Ok(())
        }

        fn as_savable(&self) -> Option<&dyn SavableTask> {
            Some(self)
        }
    }

    impl SavableTask for Note {
        fn kind(&self) -> &str {
            "note"
        }

        fn save(&self) -> Result<Payload, PersistError> {
            let mut data = Payload::new();
            data.insert("text".into(), self.text.clone().into());
            Ok(data)
        }
    }

    fn note(text: &str, log: &Arc<StdMutex<Vec<String>>>) -> TaskRef {
        Arc::new(Note {
            text: text.to_string(),
            log: log.clone(),
        })
    }

    fn note_registry(log: Arc<StdMutex<Vec<String>>>) -> KindRegistry {
        let mut registry = KindRegistry::new();
        registry.register("note", move |data, _ctx| {
            let text = data
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| PersistError::malformed("note", "missing text"))?;
            Ok(Arc::new(Note {
                text: text.to_string(),
                log: log.clone(),
            }) as TaskRef)
        });
        registry
    }

    fn logged(log: &Arc<StdMutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Task that schedules itself again with delay 0 on every run.
    struct Resched {
        scheduler: std::sync::Weak<TickedScheduler>,
        hits: Arc<AtomicUsize>,
        self_ref: OnceLock<TaskRef>,
    }

    #[async_trait]
    impl Task for Resched {
        fn name(&self) -> &str {
            "resched"
        }

        async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if let (Some(scheduler), Some(me)) = (self.scheduler.upgrade(), self.self_ref.get()) {
                scheduler.schedule(0, me.clone());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_zero_delay_runs_on_next_tick_not_synchronously() {
        let hits = Arc::new(AtomicUsize::new(0));
        let scheduler = scheduler();

        scheduler.schedule(0, hit_task("now-ish", hits.clone()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_task_runs_on_exactly_the_dth_tick_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let scheduler = scheduler();

        scheduler.schedule(3, hit_task("later", hits.clone()));

        scheduler.tick().await;
        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0, "must not run before tick 3");

        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1, "must run on tick 3");

        for _ in 0..5 {
            scheduler.tick().await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1, "must run exactly once");
        assert!(scheduler.is_empty());
    }

    #[tokio::test]
    async fn test_same_tick_tasks_run_in_insertion_order() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();

        scheduler.schedule(2, log_task("first", log.clone()));
        scheduler.schedule(2, log_task("second", log.clone()));
        scheduler.schedule(2, log_task("third", log.clone()));

        scheduler.tick().await;
        scheduler.tick().await;
        assert_eq!(logged(&log), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_scenario_two_at_three_one_at_five() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();

        scheduler.schedule(3, log_task("a", log.clone()));
        scheduler.schedule(3, log_task("b", log.clone()));
        scheduler.schedule(5, log_task("c", log.clone()));

        for _ in 0..3 {
            scheduler.tick().await;
        }
        assert_eq!(logged(&log), vec!["a", "b"]);

        scheduler.tick().await;
        scheduler.tick().await;
        assert_eq!(logged(&log), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_cancel_bucket_fires_callbacks_and_drops_plain_tasks() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();

        let cancellable = CancelTask::arc(log_task("a", log.clone()));
        cancellable.on_cancel(log_task("a-cleanup", log.clone()));
        scheduler.schedule(3, cancellable);
        scheduler.schedule(3, log_task("b", log.clone()));

        // one tick in, the bucket sits two ticks ahead
        scheduler.tick().await;
        let removed = scheduler.cancel(2).await;
        assert_eq!(removed, 2);
        assert_eq!(logged(&log), vec!["a-cleanup"], "cleanup fires at cancellation time");

        for _ in 0..5 {
            scheduler.tick().await;
        }
        assert_eq!(logged(&log), vec!["a-cleanup"], "neither a nor b ever runs");
        assert!(scheduler.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_missing_bucket_is_noop() {
        let scheduler = scheduler();
        assert_eq!(scheduler.cancel(7).await, 0);
    }

    #[tokio::test]
    async fn test_cancel_all_covers_every_bucket() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();

        let cancellable = CancelTask::arc(log_task("x", log.clone()));
        cancellable.on_cancel(log_task("x-cleanup", log.clone()));
        scheduler.schedule(1, log_task("p", log.clone()));
        scheduler.schedule(4, cancellable);
        scheduler.schedule(9, log_task("q", log.clone()));

        assert_eq!(scheduler.cancel_all().await, 3);
        assert!(scheduler.is_empty());
        assert_eq!(logged(&log), vec!["x-cleanup"]);

        for _ in 0..10 {
            scheduler.tick().await;
        }
        assert_eq!(logged(&log), vec!["x-cleanup"]);
    }

    #[tokio::test]
    async fn test_handle_cancelled_task_is_inert_in_its_bucket() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();

        let handle = CancelTask::arc(log_task("work", log.clone()));
        scheduler.schedule(2, handle.clone());

        handle.cancel(CancellationToken::new()).await;
        scheduler.tick().await;
        scheduler.tick().await;
        assert!(logged(&log).is_empty());
    }

    #[tokio::test]
    async fn test_reschedule_zero_from_inside_run_fires_next_tick() {
        let hits = Arc::new(AtomicUsize::new(0));
        let scheduler = Arc::new(scheduler());

        let task = Arc::new(Resched {
            scheduler: Arc::downgrade(&scheduler),
            hits: hits.clone(),
            self_ref: OnceLock::new(),
        });
        let _ = task.self_ref.set(task.clone() as TaskRef);

        scheduler.schedule(1, task.clone() as TaskRef);

        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1, "no same-tick recursion");

        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2, "exactly one more on the next tick");
    }

    #[tokio::test]
    async fn test_failing_task_does_not_break_its_batch() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();
        let mut rx = scheduler.bus().subscribe();

        scheduler.schedule(1, TaskFn::arc("broken", |_ctx| async {
            Err::<(), _>(TaskError::Fail { error: "boom".into() })
        }));
        scheduler.schedule(1, log_task("after", log.clone()));

        scheduler.tick().await;
        assert_eq!(logged(&log), vec!["after"]);

        let kinds = drain_kinds(&mut rx);
        assert!(kinds.contains(&EventKind::TaskFailed));
        assert!(kinds.contains(&EventKind::TaskStopped));
    }

    #[tokio::test]
    async fn test_panicking_task_is_trapped_and_batch_continues() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = scheduler();
        let mut rx = scheduler.bus().subscribe();

        scheduler.schedule(1, TaskFn::arc("explodes", |_ctx| async {
            if true {
                panic!("kaboom");
            }
            Ok::<_, TaskError>(())
        }));
        scheduler.schedule(1, log_task("survivor", log.clone()));

        scheduler.tick().await;
        assert_eq!(logged(&log), vec!["survivor"]);
        assert!(drain_kinds(&mut rx).contains(&EventKind::TaskPanicked));
    }

    #[tokio::test]
    async fn test_snapshot_restore_round_trip_preserves_delays_and_order() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let registry = note_registry(log.clone());
        let scheduler = scheduler();

        scheduler.schedule(1, note("first", &log));
        scheduler.schedule(3, note("third-a", &log));
        scheduler.schedule(3, note("third-b", &log));
        scheduler.schedule(5, note("fifth", &log));
        scheduler.schedule(2, TaskFn::arc("ephemeral", |_ctx| async {
            Ok::<_, TaskError>(())
        }));

        let records = scheduler.snapshot(&registry);
        assert_eq!(records.len(), 4, "ephemeral task is skipped");
        assert_eq!(
            records.iter().map(|r| r.delay).collect::<Vec<_>>(),
            vec![1, 3, 3, 5]
        );

        // reload on a scheduler whose absolute tick count is entirely different
        let reloaded = TickedScheduler::new(Config {
            start_tick: 9000,
            ..Config::default()
        });
        assert_eq!(reloaded.restore(records, &registry), 4);

        for _ in 0..5 {
            reloaded.tick().await;
        }
        assert_eq!(logged(&log), vec!["first", "third-a", "third-b", "fifth"]);
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn test_restore_drops_bad_records_and_keeps_the_rest() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let registry = note_registry(log.clone());
        let scheduler = scheduler();
        let mut rx = scheduler.bus().subscribe();

        let mut data = Payload::new();
        data.insert("text".into(), "kept".into());
        let records = vec![
            TaskRecord::new("vanished-feature", 1, Payload::new()),
            TaskRecord::new("note", 1, data),
            TaskRecord::new("note", 2, Payload::new()), // malformed: no text
        ];

        assert_eq!(scheduler.restore(records, &registry), 1);
        scheduler.tick().await;
        assert_eq!(logged(&log), vec!["kept"]);

        let kinds = drain_kinds(&mut rx);
        assert_eq!(
            kinds.iter().filter(|k| **k == EventKind::RestoreFailed).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_loop_schedule_expands_to_visible_firings() {
        let hits = Arc::new(AtomicUsize::new(0));
        let scheduler = scheduler();

        scheduler
            .schedule_in_loop(2, 2, 6, hit_task("pulse", hits.clone()))
            .unwrap();
        assert_eq!(scheduler.pending_len(), 4, "firings at 2, 4, 6, 8");

        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        scheduler.tick().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        for _ in 0..6 {
            scheduler.tick().await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert!(scheduler.is_empty());
    }

    #[tokio::test]
    async fn test_loop_with_zero_interval_is_rejected_up_front() {
        let scheduler = scheduler();
        let err = scheduler
            .schedule_in_loop(1, 0, 10, TaskFn::arc("never", |_ctx| async {
                Ok::<_, TaskError>(())
            }))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::ZeroInterval));
        assert!(scheduler.is_empty());
    }

    #[tokio::test]
    async fn test_loop_firings_survive_a_snapshot() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let registry = note_registry(log.clone());
        let sched = scheduler();

        sched
            .schedule_in_loop(1, 2, 4, note("beat", &log))
            .unwrap();

        let records = sched.snapshot(&registry);
        assert_eq!(records.len(), 3, "firings at 1, 3, 5 — no loop special-casing");

        let reloaded = scheduler();
        reloaded.restore(records, &registry);
        for _ in 0..5 {
            reloaded.tick().await;
        }
        assert_eq!(logged(&log), vec!["beat", "beat", "beat"]);
    }

    #[tokio::test]
    async fn test_tick_advance_is_published() {
        let scheduler = scheduler();
        let mut rx = scheduler.bus().subscribe();

        scheduler.tick().await;
        let kinds = drain_kinds(&mut rx);
        assert_eq!(kinds, vec![EventKind::TickAdvanced]);
        assert_eq!(scheduler.current_tick(), 1);
    }
}
