//! The store contract shared by every backend

use std::sync::Arc;

use crate::error::Result;

/// A string-only key/value store that outlives a single session.
///
/// Entries are never evicted or expired. Callers serialize structured
/// values themselves.
pub trait DurableStore: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Check whether a value exists for `key`
    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: DurableStore + ?Sized> DurableStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        (**self).contains_key(key)
    }
}
