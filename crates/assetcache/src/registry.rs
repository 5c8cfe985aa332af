//! In-flight request registry
//!
//! Maps a store key to one shared future of its artifact. Entries are never
//! removed, so after resolving the registry keeps answering for the key for
//! the rest of the session.

use std::collections::HashMap;
use std::future::Future;

use ahash::RandomState;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::TaskFailure;

/// Shared, resolve-once future of a raw artifact
pub type ArtifactFuture = Shared<BoxFuture<'static, Result<String, TaskFailure>>>;

/// Session-scoped map deduplicating concurrent loads by key
#[derive(Default)]
pub struct InFlightRegistry {
    entries: Mutex<HashMap<String, ArtifactFuture, RandomState>>,
}

impl InFlightRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the future registered for `key`, creating it with `factory`
    /// if there is none.
    ///
    /// `factory` runs at most once per key. The flag is `true` when this
    /// call created the entry.
    pub fn get_or_create<F, Fut>(&self, key: &str, factory: F) -> (ArtifactFuture, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, TaskFailure>> + Send + 'static,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(key) {
            return (existing.clone(), false);
        }

        let future = factory().boxed().shared();
        entries.insert(key.to_string(), future.clone());
        (future, true)
    }

    /// Check whether a request was ever registered for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// The resolved artifact for `key`, if its request has finished
    pub fn peek(&self, key: &str) -> Option<Result<String, TaskFailure>> {
        self.entries.lock().get(key).and_then(|f| f.peek().cloned())
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing was registered yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
