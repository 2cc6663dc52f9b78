//! In-memory key-value store
//!
//! Non-persistent [`KeyValueStore`] used in tests and anywhere a throwaway
//! storage namespace is good enough.

use std::collections::HashMap;

use gts_core::KeyValueStore;
use gts_domain::Result;
use parking_lot::Mutex;

/// HashMap-backed store.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries.lock().keys().filter(|key| key.starts_with(prefix)).cloned().collect()
    }
}
