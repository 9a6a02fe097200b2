//! # Built-in event printer.
//!
//! [`LogWriter`] renders every event as one terse `[label] k=v` line on
//! stdout. It exists for demos and debugging; real hosts implement
//! [`Subscribe`] against their own logging stack instead.
//!
//! ```text
//! [scheduled] task="greet" at_tick=12 delay=3
//! [tick] tick=12 due=2
//! [stopped] task="greet" tick=12
//! [bucket-cancelled] tick=15 dropped=2
//! [restore-failed] kind="greet" err="unknown kind: greet"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Prints the event stream to stdout.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a writer; it carries no state.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", render(e));
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

fn render(e: &Event) -> String {
    let task = || e.task.as_deref().unwrap_or("?");
    let reason = || e.reason.as_deref().unwrap_or("?");

    match e.kind {
        EventKind::TaskScheduled => format!(
            "[scheduled] task={:?} at_tick={} delay={}",
            task(),
            e.tick.unwrap_or(0),
            e.delay.unwrap_or(0)
        ),
        EventKind::LoopScheduled => format!(
            "[loop-scheduled] task={:?} firings={} first_delay={}",
            task(),
            e.count.unwrap_or(0),
            e.delay.unwrap_or(0)
        ),
        EventKind::TickAdvanced => {
            format!("[tick] tick={} due={}", e.tick.unwrap_or(0), e.count.unwrap_or(0))
        }
        EventKind::TaskStopped => {
            format!("[stopped] task={:?} tick={}", task(), e.tick.unwrap_or(0))
        }
        EventKind::TaskFailed => format!(
            "[failed] task={:?} tick={} err={:?}",
            task(),
            e.tick.unwrap_or(0),
            reason()
        ),
        EventKind::TaskPanicked => format!(
            "[panicked] task={:?} tick={} info={:?}",
            task(),
            e.tick.unwrap_or(0),
            reason()
        ),
        EventKind::BucketCancelled => format!(
            "[bucket-cancelled] tick={} dropped={}",
            e.tick.unwrap_or(0),
            e.count.unwrap_or(0)
        ),
        EventKind::TaskCancelled => format!(
            "[cancelled] task={:?} callbacks={}",
            task(),
            e.count.unwrap_or(0)
        ),
        EventKind::SnapshotTaken => format!(
            "[snapshot] tick={} records={}",
            e.tick.unwrap_or(0),
            e.count.unwrap_or(0)
        ),
        EventKind::SnapshotSkipped => {
            format!("[snapshot-skipped] task={:?} err={:?}", task(), reason())
        }
        EventKind::TaskRestored => {
            format!("[restored] kind={:?} delay={}", task(), e.delay.unwrap_or(0))
        }
        EventKind::RestoreFailed => {
            format!("[restore-failed] kind={:?} err={:?}", task(), reason())
        }
        EventKind::SubscriberOverflow => {
            format!("[subscriber-overflow] sub={:?} reason={:?}", task(), reason())
        }
        EventKind::SubscriberPanicked => {
            format!("[subscriber-panicked] sub={:?} info={:?}", task(), reason())
        }
    }
}
