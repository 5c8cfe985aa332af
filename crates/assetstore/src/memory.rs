//! In-memory store backend

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::durable::DurableStore;
use crate::error::Result;

/// Volatile store with the same contract as [`AssetStore`](crate::AssetStore).
///
/// Each instance is isolated, which keeps tests from sharing state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String, RandomState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_basic() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("home_svg", "<svg/>").unwrap();
        assert_eq!(store.get("home_svg").unwrap().as_deref(), Some("<svg/>"));
        assert!(store.contains_key("home_svg").unwrap());
        assert!(!store.contains_key("other_svg").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_instances_are_isolated() {
        let a = MemoryStore::new();
        let b = MemoryStore::new();

        a.set("home_svg", "<svg/>").unwrap();
        assert_eq!(b.get("home_svg").unwrap(), None);
    }
}
