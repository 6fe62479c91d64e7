//! Path filter registry

use crate::registry::StoredSet;
use crate::storage::{SharedStore, StorageResult, PATH_FILTERS_KEY};
use crate::url::matches_path_filter;

/// Persisted path filters deciding which discovered URLs get crawled
pub struct PathFilters {
    set: StoredSet,
}

impl PathFilters {
    /// Loads the registry from the store
    pub fn load(store: SharedStore) -> StorageResult<Self> {
        Ok(Self {
            set: StoredSet::load(store, PATH_FILTERS_KEY)?,
        })
    }

    /// True if no filters are stored or any filter is a case-insensitive
    /// substring of the URL or its path
    pub fn matches_filter(&self, url: &str) -> bool {
        self.snapshot().matches(url)
    }

    /// Freezes the current filters for one crawl
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot::new(self.set.values())
    }

    pub fn set(&self) -> &StoredSet {
        &self.set
    }

    pub fn set_mut(&mut self) -> &mut StoredSet {
        &mut self.set
    }
}

/// Immutable copy of the path filters taken when a crawl starts
#[derive(Debug, Clone, Default)]
pub struct FilterSnapshot {
    filters: Vec<String>,
}

impl FilterSnapshot {
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            filters: filters
                .into_iter()
                .map(|f| f.as_ref().trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        matches_path_filter(&self.filters, url)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }
}
