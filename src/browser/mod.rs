//! Browser abstraction
//!
//! The crawl engine drives pages through tabs: it looks up the active tab,
//! opens background tabs, waits for their navigation-complete signal, injects
//! the extraction probe and removes the tabs again. [`Browser`] is that
//! surface; [`HttpBrowser`] implements it with an HTTP client, and
//! [`TabController`] pairs every open with a close.

mod http;
mod lifecycle;

#[cfg(test)]
pub(crate) mod mock;

pub use http::{build_http_client, HttpBrowser};
pub use lifecycle::TabController;

use crate::probe::{PageRecord, ProbeRequest};
use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// Opaque handle to one tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The tab the user is looking at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
}

/// Tab control and script injection
#[async_trait]
pub trait Browser: Send + Sync {
    /// Looks up the active tab, if there is one
    async fn active_tab(&self) -> Result<Option<TabInfo>>;

    /// Opens an inactive background tab navigating to `url`
    async fn create_tab(&self, url: &str) -> Result<TabId>;

    /// Resolves once the tab's navigation has completed
    ///
    /// There is no timeout here; callers bound the wait themselves.
    async fn wait_for_load(&self, tab: TabId) -> Result<()>;

    /// Closes a tab
    ///
    /// Fails with [`crate::TrawlerError::TabNotFound`] if the tab is already gone.
    async fn remove_tab(&self, tab: TabId) -> Result<()>;

    /// Runs the extraction probe in the tab
    ///
    /// # Returns
    ///
    /// One record per frame; callers use the first
    async fn inject_probe(&self, tab: TabId, request: &ProbeRequest) -> Result<Vec<PageRecord>>;
}
