//! # Kind registry - bidirectional task (de)serialization context.
//!
//! [`KindRegistry`] maps stable kind identities to factories capable of
//! reconstructing a task from its persisted payload, and drives the reverse
//! direction through the [`SavableTask`](crate::SavableTask) facet.
//!
//! ## Rules
//! - Registration happens once per process lifetime, before any restore.
//! - Kind identities are globally unique within one registry; registering a
//!   duplicate is a programmer error and **panics at registration time**,
//!   never at restore time.
//! - Factories receive the registry itself, so decorator factories can
//!   reconstruct the tasks nested inside their payload.
//! - An unknown kind at restore time is a recoverable error
//!   ([`PersistError::UnknownKind`]): the caller drops that one record and
//!   keeps loading.
//!
//! ## Built-in kinds
//! [`KindRegistry::new`] pre-registers the cancellable decorator under
//! [`CANCEL_KIND`](crate::CANCEL_KIND); its payload nests the wrapped task
//! and callbacks as `{kind, data}` entries that are restored recursively.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::PersistError;
use crate::persist::record::Payload;
use crate::tasks::{CANCEL_KIND, CancelTask, TaskRef};

/// Factory reconstructing one task kind from its payload.
///
/// The second argument is the registry itself, for nested reconstruction.
pub type TaskFactory =
    Arc<dyn Fn(&Payload, &KindRegistry) -> Result<TaskRef, PersistError> + Send + Sync>;

/// Registry of task kinds and their reconstruction factories.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use tickvisor::{KindRegistry, TaskFn, TaskError};
///
/// let mut registry = KindRegistry::new();
/// registry.register("ping", |_data, _ctx| {
///     Ok(TaskFn::arc("ping", |_ctx| async { Ok::<_, TaskError>(()) }) as _)
/// });
/// assert!(registry.contains("ping"));
/// ```
pub struct KindRegistry {
    factories: HashMap<String, TaskFactory>,
}

impl KindRegistry {
    /// Creates a registry with the built-in decorator kinds pre-registered.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register(CANCEL_KIND, restore_cancel);
        registry
    }

    /// Registers a factory for a kind identity.
    ///
    /// # Panics
    /// Panics if the kind is already registered. A colliding identity is an
    /// unrecoverable naming bug; surfacing it at startup beats silently
    /// resolving to the wrong factory later.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&Payload, &KindRegistry) -> Result<TaskRef, PersistError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self
            .factories
            .insert(kind.clone(), Arc::new(factory))
            .is_some()
        {
            panic!("task kind {kind:?} registered twice");
        }
    }

    /// Returns true if a factory is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Returns the number of registered kinds (built-ins included).
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Externalizes a task to its `(kind, payload)` identity.
    ///
    /// Returns `Ok(None)` for ephemeral tasks — ones that do not expose the
    /// savable facet through every decoration layer. Callers skip those
    /// silently when taking a snapshot.
    pub fn save(&self, task: &TaskRef) -> Result<Option<(String, Payload)>, PersistError> {
        match task.as_savable() {
            None => Ok(None),
            Some(savable) => {
                let kind = savable.kind().to_string();
                let data = savable.save()?;
                Ok(Some((kind, data)))
            }
        }
    }

    /// Reconstructs a task from its `(kind, payload)` identity.
    ///
    /// Fails with [`PersistError::UnknownKind`] when the kind has no factory
    /// (e.g. the feature that registered it was removed), or with whatever
    /// error the factory raises for a malformed payload.
    pub fn restore(&self, kind: &str, data: &Payload) -> Result<TaskRef, PersistError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| PersistError::UnknownKind {
                kind: kind.to_string(),
            })?;
        factory(data, self)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for the built-in cancellable decorator kind.
fn restore_cancel(data: &Payload, ctx: &KindRegistry) -> Result<TaskRef, PersistError> {
    let inner = restore_entry(data.get("task"), ctx)?;

    let raw_callbacks = match data.get("on_cancel") {
        None => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            return Err(PersistError::malformed(
                CANCEL_KIND,
                "\"on_cancel\" is not an array",
            ));
        }
    };
    let mut on_cancel = Vec::with_capacity(raw_callbacks.len());
    for item in raw_callbacks {
        on_cancel.push(restore_entry(Some(item), ctx)?);
    }

    let cancelled = data
        .get("cancelled")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(Arc::new(CancelTask::from_parts(inner, on_cancel, cancelled)))
}

/// Restores one nested `{kind, data}` entry through the registry.
fn restore_entry(entry: Option<&Value>, ctx: &KindRegistry) -> Result<TaskRef, PersistError> {
    let obj = entry
        .and_then(Value::as_object)
        .ok_or_else(|| PersistError::malformed(CANCEL_KIND, "nested task entry is not a map"))?;
    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| PersistError::malformed(CANCEL_KIND, "nested task entry has no kind"))?;
    let data = obj
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| PersistError::malformed(CANCEL_KIND, "nested task entry has no data"))?;
    ctx.restore(kind, data)
}
