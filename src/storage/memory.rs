//! In-memory key/value store

use crate::storage::traits::{KeyValueStore, StorageResult};
use serde_json::{Map, Value};

/// Key/value store backed by a JSON map; nothing is written to disk
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> StorageResult<Map<String, Value>> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    fn set(&mut self, items: Map<String, Value>) -> StorageResult<()> {
        self.entries.extend(items);
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}
