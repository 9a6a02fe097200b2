//! # Savable facet for durable tasks.
//!
//! A [`SavableTask`] can be externalized to a `(kind, payload)` pair and
//! reconstructed later by the factory registered for that kind in a
//! [`KindRegistry`](crate::KindRegistry). The payload is an opaque key-value
//! map of JSON primitives, so it round-trips through whatever concrete file
//! format the host persists (JSON, NBT-style trees, ...).
//!
//! ## Contract
//! Reconstructing from `(kind, save())` must yield a task with the identical
//! future `run()` effect — not necessarily bit-identical fields.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use tickvisor::{Payload, PersistError, SavableTask, Task, TaskError};
//!
//! struct Greeting {
//!     who: String,
//! }
//!
//! #[async_trait]
//! impl Task for Greeting {
//!     fn name(&self) -> &str { "greeting" }
//!
//!     async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
//!         println!("hello, {}", self.who);
//!         Ok(())
//!     }
//!
//!     fn as_savable(&self) -> Option<&dyn SavableTask> { Some(self) }
//! }
//!
//! impl SavableTask for Greeting {
//!     fn kind(&self) -> &str { "greeting" }
//!
//!     fn save(&self) -> Result<Payload, PersistError> {
//!         let mut data = Payload::new();
//!         data.insert("who".into(), self.who.clone().into());
//!         Ok(data)
//!     }
//! }
//! ```

use crate::error::PersistError;
use crate::persist::Payload;
use crate::tasks::task::Task;

/// A task that can be externalized to a `(kind, payload)` record.
///
/// The kind identity must be globally unique within one registry and stable
/// across process restarts; it is what the restore side uses to look up the
/// reconstruction factory.
pub trait SavableTask: Task {
    /// Returns the stable kind identity this task is registered under.
    fn kind(&self) -> &str;

    /// Emits the opaque payload the factory for [`kind`](Self::kind) will
    /// receive on restore.
    fn save(&self) -> Result<Payload, PersistError>;
}
