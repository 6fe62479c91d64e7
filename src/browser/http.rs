//! HTTP-backed browser
//!
//! Each tab is a document fetch. The request starts when the tab is created
//! and runs as a background task; the navigation-complete signal is the task
//! finishing with the body received. Redirects are followed, and the final
//! location becomes the page URL the probe reports.

use crate::browser::{Browser, TabId, TabInfo};
use crate::config::UserAgentConfig;
use crate::probe::{extract_page, PageRecord, ProbeRequest};
use crate::{Result, TrawlerError};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::{AbortHandle, JoinHandle};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use page_trawler::config::UserAgentConfig;
/// use page_trawler::browser::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "PageTrawler".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A document that finished loading
#[derive(Debug, Clone)]
struct LoadedPage {
    final_url: Url,
    content_type: Option<String>,
    body: String,
    load_time: u64,
}

enum TabSlot {
    /// Fetch running in the background
    Loading {
        url: String,
        task: JoinHandle<std::result::Result<LoadedPage, String>>,
    },
    /// Someone is awaiting the fetch
    Waiting { url: String, abort: AbortHandle },
    Ready(LoadedPage),
    Failed { url: String, message: String },
}

/// Browser whose tabs are HTTP fetches
pub struct HttpBrowser {
    client: Client,
    start_url: Url,
    active: Mutex<Option<TabId>>,
    next_id: AtomicU64,
    tabs: Mutex<HashMap<TabId, TabSlot>>,
}

impl HttpBrowser {
    /// Creates a browser whose active tab shows `start_url`
    pub fn new(client: Client, start_url: Url) -> Self {
        Self {
            client,
            start_url,
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
            tabs: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a browser with a client built from the user agent config
    pub fn from_config(config: &UserAgentConfig, start_url: Url) -> Result<Self> {
        Ok(Self::new(build_http_client(config)?, start_url))
    }

    /// Number of tabs currently held, the active tab included
    pub fn tab_count(&self) -> usize {
        self.tabs.lock().map(|tabs| tabs.len()).unwrap_or(0)
    }

    fn tabs(&self) -> MutexGuard<'_, HashMap<TabId, TabSlot>> {
        // Slots are plain data; a panic while holding the lock leaves them usable
        self.tabs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open(&self, url: Url) -> TabId {
        let id = TabId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let location = url.to_string();
        let task = tokio::spawn(load_document(self.client.clone(), url));

        tracing::trace!("Tab {} loading {}", id, location);
        self.tabs().insert(id, TabSlot::Loading { url: location, task });
        id
    }
}

/// Fetches one document, failing the way a browser refuses to inject
async fn load_document(client: Client, url: Url) -> std::result::Result<LoadedPage, String> {
    let started = Instant::now();

    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status));
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(|e| e.to_string())?;

    Ok(LoadedPage {
        final_url,
        content_type,
        body,
        load_time: started.elapsed().as_millis() as u64,
    })
}

fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml")
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());

        let id = match *active {
            Some(id) if self.tabs().contains_key(&id) => id,
            Some(_) => return Ok(None),
            None => {
                let id = self.open(self.start_url.clone());
                *active = Some(id);
                id
            }
        };

        Ok(Some(TabInfo {
            id,
            url: self.start_url.to_string(),
        }))
    }

    async fn create_tab(&self, url: &str) -> Result<TabId> {
        let parsed = Url::parse(url).map_err(|e| TrawlerError::TabCreate {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TrawlerError::TabCreate {
                url: url.to_string(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(self.open(parsed))
    }

    async fn wait_for_load(&self, tab: TabId) -> Result<()> {
        let (url, task) = {
            let mut tabs = self.tabs();
            match tabs.remove(&tab) {
                None => return Err(TrawlerError::TabNotFound(tab.0)),
                Some(TabSlot::Loading { url, task }) => {
                    let abort = task.abort_handle();
                    tabs.insert(
                        tab,
                        TabSlot::Waiting {
                            url: url.clone(),
                            abort,
                        },
                    );
                    (url, task)
                }
                Some(TabSlot::Failed { url, message }) => {
                    tabs.insert(
                        tab,
                        TabSlot::Failed {
                            url: url.clone(),
                            message: message.clone(),
                        },
                    );
                    return Err(TrawlerError::Navigation { url, message });
                }
                Some(TabSlot::Waiting { url, abort }) => {
                    tabs.insert(tab, TabSlot::Waiting { url: url.clone(), abort });
                    return Err(TrawlerError::Navigation {
                        url,
                        message: "navigation is already being awaited".to_string(),
                    });
                }
                Some(ready @ TabSlot::Ready(_)) => {
                    tabs.insert(tab, ready);
                    return Ok(());
                }
            }
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(e.to_string()),
        };

        let mut tabs = self.tabs();
        // The tab may have been removed while we were waiting
        let still_open = tabs.contains_key(&tab);

        match outcome {
            Ok(page) => {
                if still_open {
                    tabs.insert(tab, TabSlot::Ready(page));
                }
                Ok(())
            }
            Err(message) => {
                if still_open {
                    tabs.insert(
                        tab,
                        TabSlot::Failed {
                            url: url.clone(),
                            message: message.clone(),
                        },
                    );
                }
                Err(TrawlerError::Navigation { url, message })
            }
        }
    }

    async fn remove_tab(&self, tab: TabId) -> Result<()> {
        match self.tabs().remove(&tab) {
            None => Err(TrawlerError::TabNotFound(tab.0)),
            Some(TabSlot::Loading { task, .. }) => {
                task.abort();
                Ok(())
            }
            Some(TabSlot::Waiting { abort, .. }) => {
                abort.abort();
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    async fn inject_probe(&self, tab: TabId, request: &ProbeRequest) -> Result<Vec<PageRecord>> {
        // The active tab is injected without a separate load wait
        self.wait_for_load(tab).await.map_err(|e| match e {
            TrawlerError::Navigation { url, message } => TrawlerError::Injection { url, message },
            other => other,
        })?;

        let page = match self.tabs().get(&tab) {
            Some(TabSlot::Ready(page)) => page.clone(),
            Some(_) => {
                return Err(TrawlerError::Injection {
                    url: tab.to_string(),
                    message: "document is not available".to_string(),
                })
            }
            None => return Err(TrawlerError::TabNotFound(tab.0)),
        };

        if !is_html(page.content_type.as_deref()) {
            return Err(TrawlerError::Injection {
                url: page.final_url.to_string(),
                message: "cannot access contents of a non-HTML document".to_string(),
            });
        }

        let mut record = extract_page(&page.body, &page.final_url, request);
        record.load_time = Some(page.load_time);

        Ok(vec![record])
    }
}
