//! Tab lifecycle control
//!
//! Opens a background tab, bounds the wait for its load with a timeout and
//! guarantees it is closed again. Safe to use from several crawl steps at
//! once; each step owns the handle it opened.

use crate::browser::{Browser, TabId};
use crate::{Result, TrawlerError};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Pairs every tab open with exactly one close
pub struct TabController<B: Browser + ?Sized> {
    browser: Arc<B>,
    timeout: Duration,
    open_tabs: Mutex<HashSet<TabId>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl<B: Browser + ?Sized> TabController<B> {
    /// Creates a controller
    ///
    /// # Arguments
    ///
    /// * `browser` - The browser whose tabs are managed
    /// * `timeout` - Upper bound on the wait for navigation to complete
    pub fn new(browser: Arc<B>, timeout: Duration) -> Self {
        Self {
            browser,
            timeout,
            open_tabs: Mutex::new(HashSet::new()),
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        }
    }

    pub fn browser(&self) -> &Arc<B> {
        &self.browser
    }

    /// Opens a background tab at `url` and waits for it to finish loading
    ///
    /// # Returns
    ///
    /// * `Ok(TabId)` - The loaded tab; the caller must close it
    /// * `Err(TrawlerError::TabCreate)` - No tab was opened
    /// * `Err(TrawlerError::TabTimeout)` - The tab was closed before returning
    /// * `Err(_)` - Navigation failed; the tab was closed before returning
    pub async fn open_and_wait_for_load(&self, url: &str) -> Result<TabId> {
        let tab = self
            .browser
            .create_tab(url)
            .await
            .map_err(|e| match e {
                e @ TrawlerError::TabCreate { .. } => e,
                other => TrawlerError::TabCreate {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })?;

        self.track_open(tab);
        tracing::trace!("Opened tab {} for {}", tab, url);

        match tokio::time::timeout(self.timeout, self.browser.wait_for_load(tab)).await {
            Ok(Ok(())) => Ok(tab),
            Ok(Err(e)) => {
                self.close_tab(tab).await;
                Err(e)
            }
            Err(_) => {
                self.close_tab(tab).await;
                Err(TrawlerError::TabTimeout {
                    url: url.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Closes a tab opened by this controller
    ///
    /// Closing an already closed tab does nothing. Browser errors are logged,
    /// not returned.
    pub async fn close_tab(&self, tab: TabId) {
        if !self.open_tabs().remove(&tab) {
            return;
        }

        self.closed.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.browser.remove_tab(tab).await {
            tracing::debug!("Tab {} was already gone: {}", tab, e);
        }
    }

    /// Runs `f` against a freshly loaded tab and closes the tab afterwards
    ///
    /// The tab is closed whether `f` succeeds or not.
    pub async fn with_tab<F, Fut, T>(&self, url: &str, f: F) -> Result<T>
    where
        F: FnOnce(TabId) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let tab = self.open_and_wait_for_load(url).await?;
        let result = f(tab).await;
        self.close_tab(tab).await;
        result
    }

    /// Tabs opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Tabs closed so far
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tabs currently open
    pub fn open_count(&self) -> usize {
        self.open_tabs().len()
    }

    fn track_open(&self, tab: TabId) {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.open_tabs().insert(tab);
    }

    fn open_tabs(&self) -> MutexGuard<'_, HashSet<TabId>> {
        // A set of handles stays consistent even if a holder panicked
        self.open_tabs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
