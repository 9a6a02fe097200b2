//! # Persisted record shape.
//!
//! [`TaskRecord`] is the only externally persisted shape: a sequence of
//! `{kind, delay, data}` records is what
//! [`TickedScheduler::snapshot`](crate::TickedScheduler::snapshot) emits and
//! [`TickedScheduler::restore`](crate::TickedScheduler::restore) accepts.
//! Delays are relative to the tick the snapshot was taken at, so reloading at
//! a different absolute tick count still fires tasks at the correct relative
//! future time.

use serde::{Deserialize, Serialize};

/// Opaque key-value payload a savable task externalizes to.
///
/// A map of JSON primitives; it round-trips through whatever concrete format
/// the host persists without loss.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// One pending task, externalized.
///
/// - `kind`: registry identity of the factory that reconstructs the task
/// - `delay`: remaining delay in ticks, relative to the snapshot tick
/// - `data`: the task's own opaque payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Kind identity the task was registered under.
    pub kind: String,
    /// Remaining delay in ticks at snapshot time.
    pub delay: u64,
    /// Opaque payload handed back to the factory on restore.
    pub data: Payload,
}

impl TaskRecord {
    /// Creates a record.
    pub fn new(kind: impl Into<String>, delay: u64, data: Payload) -> Self {
        Self {
            kind: kind.into(),
            delay,
            data,
        }
    }
}
