//! Storage module for persisting registries, results and run history
//!
//! This module handles:
//! - A key/value store holding path filters, CSS selectors, the last crawl
//!   result and the last-used output format
//! - SQLite database initialization and schema management
//! - Crawl run tracking for `--history`

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, RunLog, StorageError, StorageResult};

use crate::state::CrawlPhase;
use std::sync::{Arc, Mutex, MutexGuard};

/// Key holding the path filter registry
pub const PATH_FILTERS_KEY: &str = "pathFilters";

/// Key holding the CSS selector registry
pub const CSS_SELECTORS_KEY: &str = "cssSelectors";

/// Key holding the last CrawlResult
pub const EXTRACTED_DATA_KEY: &str = "extractedData";

/// Key holding the last-used output format
pub const OUTPUT_FORMAT_KEY: &str = "outputFormat";

/// A key/value store shared between registries and the binary
pub type SharedStore = Arc<Mutex<dyn KeyValueStore + Send>>;

/// Wraps a store for sharing
pub fn shared<S: KeyValueStore + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared store, mapping poisoning to a storage error
pub fn lock(store: &SharedStore) -> StorageResult<MutexGuard<'_, dyn KeyValueStore + Send + 'static>> {
    store.lock().map_err(|_| StorageError::Poisoned)
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub start_url: String,
    pub status: RunStatus,
    pub pages: u64,
    pub failures: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl From<CrawlPhase> for RunStatus {
    fn from(phase: CrawlPhase) -> Self {
        match phase {
            CrawlPhase::Completed => Self::Completed,
            CrawlPhase::Cancelled => Self::Cancelled,
            CrawlPhase::Failed => Self::Failed,
            CrawlPhase::Idle | CrawlPhase::Starting | CrawlPhase::Running => Self::Running,
        }
    }
}
