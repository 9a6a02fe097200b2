//! # The public scheduling contract.
//!
//! [`Schedule`] is what calling code programs against: register a task to run
//! a number of ticks from now, or register a whole repeating loop up front.
//! [`TickedScheduler`](crate::TickedScheduler) implements it; hosts that run
//! several independent sessions construct one scheduler per session and hand
//! each subsystem the instance it should use (see
//! [`init_default`](crate::init_default) for the process-wide one).
//!
//! ## Delay semantics
//! Delays are counted in ticks. A delay of `d >= 1` runs the task on the
//! `d`-th subsequent tick advance; a delay of 0 means "on the next tick
//! advance", never synchronously.

use crate::error::ScheduleError;
use crate::tasks::TaskRef;

/// Scheduling contract implemented by tick-driven schedulers.
pub trait Schedule: Send + Sync {
    /// Registers `task` to run `delay` ticks from now.
    ///
    /// Never fails: any task is accepted, including ones that reschedule
    /// themselves from inside `run` (those land in a future bucket).
    fn schedule(&self, delay: u64, task: TaskRef);

    /// Registers repeated runs of `task`: first after `delay` ticks, then
    /// every `interval` ticks, until the cumulative offset would exceed
    /// `delay + duration`.
    ///
    /// This is sugar over repeated [`schedule`](Self::schedule) calls computed
    /// up front — not a self-rescheduling task — so the full set of future
    /// firings is always visible to a snapshot without special-casing loops.
    ///
    /// Fails with [`ScheduleError::ZeroInterval`] when `interval == 0`, which
    /// would register an unbounded number of entries.
    fn schedule_in_loop(
        &self,
        delay: u64,
        interval: u64,
        duration: u64,
        task: TaskRef,
    ) -> Result<(), ScheduleError> {
        for offset in loop_offsets(delay, interval, duration)? {
            self.schedule(offset, task.clone());
        }
        Ok(())
    }
}

/// Expands a loop registration into its individual firing offsets.
///
/// Offsets start at `delay` and step by `interval` while they stay within
/// `delay + duration` (inclusive). Additions saturate/stop at `u64::MAX`.
pub(crate) fn loop_offsets(
    delay: u64,
    interval: u64,
    duration: u64,
) -> Result<Vec<u64>, ScheduleError> {
    if interval == 0 {
        return Err(ScheduleError::ZeroInterval);
    }
    let limit = delay.saturating_add(duration);
    let mut offsets = Vec::new();
    let mut offset = delay;
    while offset <= limit {
        offsets.push(offset);
        match offset.checked_add(interval) {
            Some(next) => offset = next,
            None => break,
        }
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_offsets_cover_delay_through_duration() {
        let offsets = loop_offsets(2, 2, 6).unwrap();
        assert_eq!(offsets, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_loop_offsets_single_firing_for_zero_duration() {
        let offsets = loop_offsets(5, 3, 0).unwrap();
        assert_eq!(offsets, vec![5]);
    }

    #[test]
    fn test_loop_offsets_partial_last_step_is_dropped() {
        // 3, 7, 11 <= 12; 15 exceeds delay + duration
        let offsets = loop_offsets(3, 4, 9).unwrap();
        assert_eq!(offsets, vec![3, 7, 11]);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = loop_offsets(1, 0, 10).unwrap_err();
        assert_eq!(err.as_label(), "schedule_zero_interval");
    }
}
