//! # Capture decorator: bind a key, not a reference.
//!
//! [`CaptureTask`] lets deferred work close over a short-lived identifier of
//! some external entity ("the player with this UUID", "the session with this
//! id") instead of a direct reference, because the direct reference may not
//! be valid after a save/reload, or may outlive the entity it names.
//!
//! ## Rules
//! - Only the serializable key is ever stored — never the live value.
//! - Resolution happens at **run time**, not at restore time: the entity may
//!   not exist yet when a snapshot loads (a world still being constructed)
//!   but may exist by the time the tick arrives.
//! - A failed resolution is an expected outcome, not an error: the task
//!   completes silently with no effect, no retry, nothing published.
//!
//! ## Persistence
//! The payload stores the serialized key under `"key"`. The kind identity is
//! supplied per use-site; the use-site registers a factory that rebuilds the
//! resolver and effect and calls [`CaptureTask::restore`].
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tickvisor::{CaptureTask, TaskError};
//!
//! #[derive(Clone)]
//! struct Player { id: u64, name: String }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let players: Arc<HashMap<u64, Player>> = Arc::new(HashMap::from([
//!     (7, Player { id: 7, name: "alice".into() }),
//! ]));
//!
//! let lookup = players.clone();
//! let greet = CaptureTask::arc(
//!     "greet-player",
//!     &players[&7],
//!     |p| p.id,
//!     move |id| lookup.get(id).cloned(),
//!     |player: Player, _ctx| async move {
//!         println!("hello, {}", player.name);
//!         Ok::<_, TaskError>(())
//!     },
//! );
//! # let _ = greet;
//! # }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{PersistError, TaskError};
use crate::persist::Payload;
use crate::tasks::savable::SavableTask;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Task bound to an external entity through a serializable key.
///
/// Holds the key `K`, a resolver `K -> Option<T>`, and the actual work as a
/// function of the resolved live value. The wrapped work executes iff
/// resolution at run time yields a live value.
pub struct CaptureTask<K, T> {
    kind: Cow<'static, str>,
    key: K,
    resolver: Arc<dyn Fn(&K) -> Option<T> + Send + Sync>,
    effect: Arc<dyn Fn(T, CancellationToken) -> BoxTaskFuture + Send + Sync>,
}

impl<K: std::fmt::Debug, T> std::fmt::Debug for CaptureTask<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureTask")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish()
    }
}

impl<K, T> CaptureTask<K, T>
where
    K: Serialize + DeserializeOwned + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Binds deferred work to a live value by deriving its key.
    ///
    /// The live value is only used here, to compute the key; later runs go
    /// through the resolver again.
    pub fn new<R, E, Fut>(
        kind: impl Into<Cow<'static, str>>,
        live: &T,
        key_of: impl FnOnce(&T) -> K,
        resolver: R,
        effect: E,
    ) -> Self
    where
        R: Fn(&K) -> Option<T> + Send + Sync + 'static,
        E: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::from_key(kind, key_of(live), resolver, effect)
    }

    /// Binds deferred work to an already-known key.
    ///
    /// This is the factory-side constructor; prefer [`CaptureTask::new`] when
    /// the live value is at hand.
    pub fn from_key<R, E, Fut>(
        kind: impl Into<Cow<'static, str>>,
        key: K,
        resolver: R,
        effect: E,
    ) -> Self
    where
        R: Fn(&K) -> Option<T> + Send + Sync + 'static,
        E: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            kind: kind.into(),
            key,
            resolver: Arc::new(resolver),
            effect: Arc::new(move |live, ctx| Box::pin(effect(live, ctx)) as BoxTaskFuture),
        }
    }

    /// Like [`CaptureTask::new`], returning a shared handle.
    pub fn arc<R, E, Fut>(
        kind: impl Into<Cow<'static, str>>,
        live: &T,
        key_of: impl FnOnce(&T) -> K,
        resolver: R,
        effect: E,
    ) -> Arc<Self>
    where
        R: Fn(&K) -> Option<T> + Send + Sync + 'static,
        E: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Arc::new(Self::new(kind, live, key_of, resolver, effect))
    }

    /// Rebuilds a capture from a persisted payload.
    ///
    /// Intended for registry factories: parse the key back out of `data`,
    /// then supply the same resolver and effect the use-site always uses.
    pub fn restore<R, E, Fut>(
        kind: impl Into<Cow<'static, str>>,
        data: &Payload,
        resolver: R,
        effect: E,
    ) -> Result<Self, PersistError>
    where
        R: Fn(&K) -> Option<T> + Send + Sync + 'static,
        E: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let kind = kind.into();
        let raw = data
            .get("key")
            .ok_or_else(|| PersistError::malformed(kind.as_ref(), "missing \"key\" field"))?;
        let key: K = serde_json::from_value(raw.clone())
            .map_err(|e| PersistError::malformed(kind.as_ref(), e.to_string()))?;
        Ok(Self::from_key(kind, key, resolver, effect))
    }

    /// Returns the captured key.
    pub fn key(&self) -> &K {
        &self.key
    }
}

#[async_trait]
impl<K, T> Task for CaptureTask<K, T>
where
    K: Serialize + DeserializeOwned + Send + Sync + 'static,
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.kind
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        // Resolve at run time; a vanished entity is nothing to do, not an error.
        match (self.resolver)(&self.key) {
            Some(live) => (self.effect)(live, ctx).await,
            None => Ok(()),
        }
    }

    fn as_savable(&self) -> Option<&dyn SavableTask> {
        Some(self)
    }
}

impl<K, T> SavableTask for CaptureTask<K, T>
where
    K: Serialize + DeserializeOwned + Send + Sync + 'static,
    T: Send + 'static,
{
    fn kind(&self) -> &str {
        &self.kind
    }

    fn save(&self) -> Result<Payload, PersistError> {
        let key = serde_json::to_value(&self.key).map_err(|e| PersistError::Unsavable {
            kind: self.kind.to_string(),
            detail: e.to_string(),
        })?;
        let mut data = Payload::new();
        data.insert("key".into(), key);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Value;

    use super::*;

    fn directory() -> Arc<HashMap<u64, String>> {
        Arc::new(HashMap::from([(7, "alice".to_string()), (9, "bob".to_string())]))
    }

    #[tokio::test]
    async fn test_effect_runs_once_with_resolved_value() {
        let seen = Arc::new(AtomicUsize::new(0));
        let dir = directory();
        let lookup = dir.clone();
        let seen_in_effect = seen.clone();

        let task = CaptureTask::from_key(
            "greet",
            7u64,
            move |id| lookup.get(id).cloned(),
            move |name: String, _ctx| {
                let seen = seen_in_effect.clone();
                async move {
                    assert_eq!(name, "alice");
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(())
                }
            },
        );

        task.run(CancellationToken::new()).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_entity_is_silent() {
        let seen = Arc::new(AtomicUsize::new(0));
        let dir = directory();
        let lookup = dir.clone();
        let seen_in_effect = seen.clone();

        let task = CaptureTask::from_key(
            "greet",
            42u64,
            move |id| lookup.get(id).cloned(),
            move |_name: String, _ctx| {
                let seen = seen_in_effect.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(())
                }
            },
        );

        task.run(CancellationToken::new()).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_new_derives_key_from_live_value() {
        let dir = directory();
        let lookup = dir.clone();
        let task = CaptureTask::new(
            "greet",
            &"alice".to_string(),
            |_name| 7u64,
            move |id| lookup.get(id).cloned(),
            |_name: String, _ctx| async move { Ok::<_, TaskError>(()) },
        );
        assert_eq!(*task.key(), 7);
    }

    #[test]
    fn test_save_stores_only_the_key() {
        let dir = directory();
        let lookup = dir.clone();
        let task = CaptureTask::from_key(
            "greet",
            9u64,
            move |id| lookup.get(id).cloned(),
            |_name: String, _ctx| async move { Ok::<_, TaskError>(()) },
        );

        let data = task.save().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("key"), Some(&Value::from(9)));
    }

    #[test]
    fn test_restore_round_trips_the_key() {
        let dir = directory();
        let lookup = dir.clone();
        let mut data = Payload::new();
        data.insert("key".into(), Value::from(9));

        let task = CaptureTask::restore(
            "greet",
            &data,
            move |id| lookup.get(id).cloned(),
            |_name: String, _ctx| async move { Ok::<_, TaskError>(()) },
        )
        .unwrap();
        assert_eq!(*task.key(), 9);
    }

    #[test]
    fn test_restore_rejects_missing_key() {
        let dir = directory();
        let lookup = dir.clone();
        let err = CaptureTask::<u64, String>::restore(
            "greet",
            &Payload::new(),
            move |id| lookup.get(id).cloned(),
            |_name: String, _ctx| async move { Ok::<_, TaskError>(()) },
        )
        .unwrap_err();
        assert_eq!(err.as_label(), "persist_malformed");
    }
}
