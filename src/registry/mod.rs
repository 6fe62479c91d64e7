//! Filter and selector registries
//!
//! Two persisted unique-string collections consulted when a crawl starts:
//! path filters gate which discovered URLs are queued, CSS selectors name the
//! custom content extracted from each page.

mod filters;
mod selectors;
mod stored_set;

pub use filters::{FilterSnapshot, PathFilters};
pub use selectors::CssSelectors;
pub use stored_set::StoredSet;
