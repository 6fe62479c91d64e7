//! Storage traits and error types
//!
//! This module defines the key/value interface used for registries and saved
//! crawl results, and the run log interface used for crawl history.

use crate::storage::{RunRecord, RunStatus};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted key/value store with JSON values
///
/// Mirrors a browser extension's local storage area: reads return only the
/// keys that exist, writes replace whole values.
pub trait KeyValueStore {
    /// Reads the given keys
    ///
    /// # Returns
    ///
    /// A map containing only the keys that have a stored value
    fn get(&self, keys: &[&str]) -> StorageResult<Map<String, Value>>;

    /// Writes every entry of `items`, replacing existing values
    fn set(&mut self, items: Map<String, Value>) -> StorageResult<()>;

    /// Deletes the given keys; missing keys are ignored
    fn remove(&mut self, keys: &[&str]) -> StorageResult<()>;

    /// Reads a single key
    fn get_one(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.get(&[key])?.remove(key))
    }

    /// Writes a single key
    fn set_one(&mut self, key: &str, value: Value) -> StorageResult<()> {
        let mut items = Map::new();
        items.insert(key.to_string(), value);
        self.set(items)
    }
}

/// Log of crawl runs
pub trait RunLog {
    /// Records the start of a crawl
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `start_url` - The seed page
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, start_url: &str) -> StorageResult<i64>;

    /// Records the terminal status and counters of a run
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages: u64,
        failures: u64,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
