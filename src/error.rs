//! Error types used by the tickvisor scheduler and tasks.
//!
//! This module defines three error enums:
//!
//! - [`ScheduleError`] — errors raised when registering work with a scheduler.
//! - [`TaskError`] — errors raised by individual task executions.
//! - [`PersistError`] — errors raised while externalizing or reconstructing tasks.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Note the asymmetry in severity: scheduling errors fail fast at the call site,
//! while persistence errors are recoverable per record (one bad record is dropped,
//! the rest of the batch still loads).

use thiserror::Error;

/// Best-effort extraction of a message from a trapped panic payload.
///
/// Panic payloads are `&'static str` or `String` in practice; anything else
/// collapses to a placeholder.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// # Errors produced while registering work with a scheduler.
///
/// These are configuration errors: they surface synchronously at the call
/// site and are never deferred to tick time.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A repeating schedule was requested with a zero tick interval, which
    /// would enqueue an unbounded number of entries.
    #[error("loop interval must be at least one tick")]
    ZeroInterval,

    /// The process-wide default scheduler was already initialized.
    #[error("default scheduler already initialized")]
    DefaultAlreadySet,
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::ScheduleError;
    ///
    /// assert_eq!(ScheduleError::ZeroInterval.as_label(), "schedule_zero_interval");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::ZeroInterval => "schedule_zero_interval",
            ScheduleError::DefaultAlreadySet => "schedule_default_already_set",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScheduleError::ZeroInterval => "loop interval must be at least one tick".to_string(),
            ScheduleError::DefaultAlreadySet => "default scheduler already initialized".to_string(),
        }
    }
}

/// # Errors produced by task execution.
///
/// A failing task never breaks the rest of its tick batch: the scheduler
/// publishes the failure as an event and keeps draining the bucket.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed a cancelled runtime token and stopped early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # Errors produced at the persistence boundary.
///
/// Raised while externalizing a pending task to a record or reconstructing
/// one from a record. All variants are recoverable at batch level: the
/// scheduler drops the one affected record and continues.
///
/// Duplicate kind registration is deliberately *not* represented here — it is
/// a programmer error and [`KindRegistry::register`](crate::KindRegistry::register)
/// panics at startup instead of deferring the collision to restore time.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PersistError {
    /// The record references a kind identity with no registered factory
    /// (e.g. a feature module was removed since the snapshot was taken).
    #[error("no factory registered for task kind {kind:?}")]
    UnknownKind {
        /// The unresolved kind identity.
        kind: String,
    },

    /// The payload does not match what the factory for this kind expects.
    #[error("malformed payload for task kind {kind:?}: {detail}")]
    Malformed {
        /// Kind identity whose factory rejected the payload.
        kind: String,
        /// What was wrong with the payload.
        detail: String,
    },

    /// A savable task failed to emit its payload.
    #[error("task kind {kind:?} could not be externalized: {detail}")]
    Unsavable {
        /// Kind identity of the task that failed to save.
        kind: String,
        /// The underlying serialization error.
        detail: String,
    },
}

impl PersistError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PersistError::UnknownKind { .. } => "persist_unknown_kind",
            PersistError::Malformed { .. } => "persist_malformed",
            PersistError::Unsavable { .. } => "persist_unsavable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PersistError::UnknownKind { kind } => format!("unknown kind: {kind}"),
            PersistError::Malformed { kind, detail } => format!("kind {kind}: {detail}"),
            PersistError::Unsavable { kind, detail } => format!("kind {kind}: {detail}"),
        }
    }

    /// Convenience constructor for payload shape violations.
    pub fn malformed(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        PersistError::Malformed {
            kind: kind.into(),
            detail: detail.into(),
        }
    }
}
