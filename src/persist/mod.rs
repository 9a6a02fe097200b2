//! # Persistence boundary: records and the kind registry.
//!
//! Pending tasks cross a save/load boundary as `(kind, relative-delay,
//! payload)` records. This module provides:
//! - [`Payload`], [`TaskRecord`] the externally persisted shape
//! - [`KindRegistry`], [`TaskFactory`] the bidirectional mapping between live
//!   tasks and their persisted identities
//!
//! The scheduler owns the conversion between absolute bucket ticks and the
//! relative delays stored in records; this module never sees tick numbers.

mod record;
mod registry;

pub use record::{Payload, TaskRecord};
pub use registry::{KindRegistry, TaskFactory};
