//! CSS selector registry

use crate::registry::StoredSet;
use crate::storage::{SharedStore, StorageResult, CSS_SELECTORS_KEY};

/// Persisted custom CSS selectors evaluated on every page
pub struct CssSelectors {
    set: StoredSet,
}

impl CssSelectors {
    /// Loads the registry from the store
    pub fn load(store: SharedStore) -> StorageResult<Self> {
        Ok(Self {
            set: StoredSet::load(store, CSS_SELECTORS_KEY)?,
        })
    }

    /// The selectors to hand to one crawl, in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        self.set.values()
    }

    pub fn set(&self) -> &StoredSet {
        &self.set
    }

    pub fn set_mut(&mut self) -> &mut StoredSet {
        &mut self.set
    }
}
