//! Memory-only `KeyValueStore`.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-local key-value map.
///
/// Clones share the same map, so a test can keep one clone to inspect what
/// a store wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one value.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
