//! Scripted browser for unit tests

use crate::browser::{Browser, TabId, TabInfo};
use crate::probe::{extract_page, PageRecord, ProbeRequest};
use crate::{Result, TrawlerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// How a scripted URL behaves
#[derive(Debug, Clone)]
pub(crate) enum MockPage {
    /// Loads and serves `html`, reporting `final_url` as its location
    Html { final_url: Option<String>, html: String },
    /// Never finishes loading
    Hang,
    /// `create_tab` fails
    CreateError,
    /// Navigation fails
    LoadError,
    /// Loads, but the probe cannot be injected
    InjectError,
}

impl MockPage {
    pub(crate) fn html(html: &str) -> Self {
        Self::Html {
            final_url: None,
            html: html.to_string(),
        }
    }

    pub(crate) fn redirect(final_url: &str, html: &str) -> Self {
        Self::Html {
            final_url: Some(final_url.to_string()),
            html: html.to_string(),
        }
    }
}

pub(crate) struct MockBrowser {
    active: Option<TabInfo>,
    pages: HashMap<String, MockPage>,
    load_delay: Duration,
    page_delays: HashMap<String, Duration>,
    next_id: AtomicU64,
    tabs: Mutex<HashMap<TabId, String>>,
    created: AtomicUsize,
    removed: AtomicUsize,
    max_open: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl MockBrowser {
    /// A browser whose active tab shows `active_url`
    pub(crate) fn new(active_url: &str) -> Self {
        Self {
            active: Some(TabInfo {
                id: TabId(0),
                url: active_url.to_string(),
            }),
            pages: HashMap::new(),
            load_delay: Duration::ZERO,
            page_delays: HashMap::new(),
            next_id: AtomicU64::new(1),
            tabs: Mutex::new(HashMap::new()),
            created: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            max_open: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A browser with no active tab
    pub(crate) fn without_active_tab() -> Self {
        let mut browser = Self::new("about:blank");
        browser.active = None;
        browser
    }

    pub(crate) fn with_page(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub(crate) fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Extra load time for one URL, on top of the shared load delay
    pub(crate) fn with_page_delay(mut self, url: &str, delay: Duration) -> Self {
        self.page_delays.insert(url.to_string(), delay);
        self
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    /// Highest number of background tabs open at the same time
    pub(crate) fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    /// URLs passed to `create_tab`, in call order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn url_of(&self, tab: TabId) -> Result<String> {
        if let Some(active) = self.active.as_ref().filter(|a| a.id == tab) {
            return Ok(active.url.clone());
        }
        self.tabs
            .lock()
            .unwrap()
            .get(&tab)
            .cloned()
            .ok_or(TrawlerError::TabNotFound(tab.0))
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        Ok(self.active.clone())
    }

    async fn create_tab(&self, url: &str) -> Result<TabId> {
        self.requests.lock().unwrap().push(url.to_string());

        if matches!(self.pages.get(url), Some(MockPage::CreateError)) {
            return Err(TrawlerError::TabCreate {
                url: url.to_string(),
                message: "scripted failure".to_string(),
            });
        }

        let id = TabId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let open = {
            let mut tabs = self.tabs.lock().unwrap();
            tabs.insert(id, url.to_string());
            tabs.len()
        };
        self.created.fetch_add(1, Ordering::SeqCst);
        self.max_open.fetch_max(open, Ordering::SeqCst);
        Ok(id)
    }

    async fn wait_for_load(&self, tab: TabId) -> Result<()> {
        let url = self.url_of(tab)?;

        let delay = self.load_delay + self.page_delays.get(&url).copied().unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(&url) {
            Some(MockPage::Hang) => std::future::pending().await,
            Some(MockPage::LoadError) | None => Err(TrawlerError::Navigation {
                url,
                message: "net::ERR_FAILED".to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    async fn remove_tab(&self, tab: TabId) -> Result<()> {
        match self.tabs.lock().unwrap().remove(&tab) {
            Some(_) => {
                self.removed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(TrawlerError::TabNotFound(tab.0)),
        }
    }

    async fn inject_probe(&self, tab: TabId, request: &ProbeRequest) -> Result<Vec<PageRecord>> {
        // The active tab may still be loading
        if self.active.as_ref().is_some_and(|a| a.id == tab) {
            self.wait_for_load(tab).await?;
        }
        let url = self.url_of(tab)?;

        match self.pages.get(&url) {
            Some(MockPage::Html { final_url, html }) => {
                let location = final_url.as_deref().unwrap_or(&url);
                let page_url = Url::parse(location)?;
                Ok(vec![extract_page(html, &page_url, request)])
            }
            _ => Err(TrawlerError::Injection {
                url,
                message: "Cannot access contents of the page".to_string(),
            }),
        }
    }
}
