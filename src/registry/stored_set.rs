//! Persisted set of unique strings
//!
//! Values keep insertion order. Every effective mutation writes the whole
//! array to the store before it is published to subscribers; if the write
//! fails the in-memory set is restored and the error is returned.

use crate::storage::{lock, SharedStore, StorageResult};
use indexmap::IndexSet;
use serde_json::Value;
use tokio::sync::watch;

/// A unique-string collection mirrored to one key of a key/value store
pub struct StoredSet {
    key: &'static str,
    store: SharedStore,
    values: IndexSet<String>,
    changes: watch::Sender<Vec<String>>,
}

impl StoredSet {
    /// Loads the set stored under `key`
    ///
    /// A missing key yields an empty set. Non-string and blank entries are
    /// skipped.
    pub fn load(store: SharedStore, key: &'static str) -> StorageResult<Self> {
        let stored = lock(&store)?.get_one(key)?;

        let values: IndexSet<String> = match stored {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            Some(other) => {
                tracing::warn!("Ignoring non-array value stored under {}: {}", key, other);
                IndexSet::new()
            }
            None => IndexSet::new(),
        };

        tracing::debug!("Loaded {} value(s) from {}", values.len(), key);

        let (changes, _) = watch::channel(values.iter().cloned().collect());

        Ok(Self {
            key,
            store,
            values,
            changes,
        })
    }

    /// Adds a trimmed, non-empty value
    ///
    /// # Returns
    ///
    /// `Ok(false)` without saving if the value is blank or already present
    pub fn add(&mut self, value: &str) -> StorageResult<bool> {
        let value = value.trim();
        if value.is_empty() || self.values.contains(value) {
            return Ok(false);
        }

        let previous = self.values.clone();
        self.values.insert(value.to_string());
        self.commit(previous)?;
        Ok(true)
    }

    /// Removes a value
    ///
    /// # Returns
    ///
    /// `Ok(false)` without saving if the value was not present
    pub fn remove(&mut self, value: &str) -> StorageResult<bool> {
        let value = value.trim();
        if !self.values.contains(value) {
            return Ok(false);
        }

        let previous = self.values.clone();
        self.values.shift_remove(value);
        self.commit(previous)?;
        Ok(true)
    }

    /// Removes every value; always saves
    pub fn clear(&mut self) -> StorageResult<()> {
        let previous = std::mem::take(&mut self.values);
        self.commit(previous)
    }

    /// Current values in insertion order
    pub fn values(&self) -> Vec<String> {
        self.values.iter().cloned().collect()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value.trim())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The store key this set is mirrored to
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Receives the full contents after every committed mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.changes.subscribe()
    }

    fn commit(&mut self, previous: IndexSet<String>) -> StorageResult<()> {
        let array = Value::Array(self.values.iter().cloned().map(Value::String).collect());
        let saved = lock(&self.store).and_then(|mut store| store.set_one(self.key, array));

        if let Err(e) = saved {
            tracing::warn!("Failed to save {}, rolling back: {}", self.key, e);
            self.values = previous;
            return Err(e);
        }

        self.changes.send_replace(self.values());
        Ok(())
    }
}
