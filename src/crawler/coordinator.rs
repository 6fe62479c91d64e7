//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier, the tab
//! lifecycle controller and the extraction probe together:
//! - Extracting the seed page from the active tab
//! - Queuing discovered same-origin links through the path filters
//! - Processing pending URLs in background tabs, up to `max-concurrent` at once
//! - Emitting progress after every completed URL
//! - Stopping cooperatively on cancellation with partial results

use crate::browser::{Browser, TabController};
use crate::crawler::progress::{CrawlProgress, CrawlStats, ProgressStatus};
use crate::crawler::{CrawlOptions, CrawlResult};
use crate::probe::{PageRecord, ProbeRequest};
use crate::registry::FilterSnapshot;
use crate::state::{CrawlPhase, Frontier};
use crate::{Result, TrawlerError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Callback receiving progress events
pub type ProgressCallback = Box<dyn Fn(&CrawlProgress) + Send + Sync>;

/// Terminal artifact of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// `Completed` or `Cancelled`
    pub status: CrawlPhase,
    pub result: CrawlResult,
    pub stats: CrawlStats,
}

/// What happened to one URL handed to a crawl step
enum StepOutcome {
    Extracted { requested: String, record: PageRecord },
    Failed { requested: String, error: TrawlerError },
    /// Cancelled during the request delay, before any tab was opened
    Abandoned { requested: String },
}

/// Main crawler coordinator structure
pub struct Coordinator<B: Browser + ?Sized> {
    tabs: TabController<B>,
    options: CrawlOptions,
    filters: FilterSnapshot,
    selectors: Vec<String>,
    frontier: Frontier,
    phase: CrawlPhase,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl<B: Browser + ?Sized> Coordinator<B> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `browser` - Provides the active tab and background tabs
    /// * `options` - Timeouts, delay, concurrency and probe options
    pub fn new(browser: Arc<B>, options: CrawlOptions) -> Self {
        Self {
            tabs: TabController::new(browser, options.navigation_timeout),
            options,
            filters: FilterSnapshot::default(),
            selectors: Vec::new(),
            frontier: Frontier::new(),
            phase: CrawlPhase::Idle,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Sets the path filters applied at discovery time
    pub fn with_filters(mut self, filters: FilterSnapshot) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the custom CSS selectors evaluated on every page
    pub fn with_selectors(mut self, selectors: Vec<String>) -> Self {
        self.selectors = selectors;
        self
    }

    /// Registers the progress callback, replacing any previous one
    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: Fn(&CrawlProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
    }

    /// Requests cancellation; takes effect before the next URL is handed out
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this coordinator's crawl when cancelled
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn tabs(&self) -> &TabController<B> {
        &self.tabs
    }

    /// Runs one crawl from the active tab
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Completed or cancelled, with every page extracted so far
    /// * `Err(TrawlerError::NoActiveTab)` - No active tab to start from
    /// * `Err(TrawlerError::SeedExtraction)` - The starting page could not be read
    pub async fn start(&mut self) -> Result<CrawlOutcome> {
        self.transition(CrawlPhase::Starting)?;
        self.frontier.reset();
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        let started = Instant::now();
        let opened_before = self.tabs.opened();
        let closed_before = self.tabs.closed();
        let request = ProbeRequest::new(self.selectors.clone(), self.options.probe);

        let seed = match self.extract_seed(&request).await {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!("Crawl failed before it started: {}", e);
                self.transition(CrawlPhase::Failed)?;
                return Err(e);
            }
        };

        let mut result = CrawlResult::new();
        let mut stats = CrawlStats {
            processed: 1,
            succeeded: 1,
            ..CrawlStats::default()
        };

        let seed_key = seed.url.clone();
        self.frontier.seed(&seed_key);
        let added = self.frontier.discover(&seed.links, |url| self.filters.matches(url));
        tracing::debug!("Seed page {} queued {} link(s)", seed_key, added);
        result.insert(seed_key.clone(), seed);

        self.emit(stats.processed, &seed_key, ProgressStatus::Success, None);

        self.transition(CrawlPhase::Running)?;
        tracing::info!(
            "Crawling from {} ({} pending, max {} concurrent)",
            seed_key,
            self.frontier.pending_len(),
            self.options.max_concurrent
        );

        self.run_loop(&request, &mut result, &mut stats).await;

        let status = if self.cancel.is_cancelled() {
            CrawlPhase::Cancelled
        } else {
            CrawlPhase::Completed
        };
        self.transition(status)?;

        stats.remaining = self.frontier.pending_len();
        stats.tabs_opened = self.tabs.opened() - opened_before;
        stats.tabs_closed = self.tabs.closed() - closed_before;
        stats.elapsed = started.elapsed();

        tracing::info!(
            "Crawl {}: {} page(s) extracted, {} failed, {} left pending in {:?}",
            status,
            stats.succeeded,
            stats.failed,
            stats.remaining,
            stats.elapsed
        );

        Ok(CrawlOutcome {
            status,
            result,
            stats,
        })
    }

    /// Reads the page in the active tab
    ///
    /// The start page is marked visited under both the tab's URL and the
    /// page's own reported location.
    async fn extract_seed(&mut self, request: &ProbeRequest) -> Result<PageRecord> {
        let browser = self.tabs.browser();

        let active = browser
            .active_tab()
            .await?
            .ok_or(TrawlerError::NoActiveTab)?;

        tracing::debug!("Extracting seed page {} from tab {}", active.url, active.id);

        let timeout = self.options.navigation_timeout;
        let seed = match tokio::time::timeout(timeout, browser.inject_probe(active.id, request)).await {
            Ok(frames) => frames,
            Err(_) => Err(TrawlerError::TabTimeout {
                url: active.url.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        };
        let seed = seed
            .and_then(|frames| first_frame(frames, &active.url))
            .map_err(|e| TrawlerError::SeedExtraction {
                url: active.url.clone(),
                reason: e.to_string(),
            })?;

        self.frontier.seed(&active.url);
        Ok(seed)
    }

    async fn run_loop(&mut self, request: &ProbeRequest, result: &mut CrawlResult, stats: &mut CrawlStats) {
        let max_concurrent = self.options.max_concurrent.max(1);
        let mut in_flight = FuturesUnordered::new();
        let mut first_open = true;

        loop {
            while in_flight.len() < max_concurrent && !self.cancel.is_cancelled() {
                let Some(url) = self.frontier.pop_next() else {
                    break;
                };

                let delay = if first_open {
                    Duration::ZERO
                } else {
                    self.options.request_delay
                };
                first_open = false;

                tracing::trace!("Dispatching {}", url);
                in_flight.push(process_url(
                    &self.tabs,
                    url,
                    request,
                    delay,
                    self.cancel.clone(),
                ));
            }

            let Some(outcome) = in_flight.next().await else {
                break;
            };

            match outcome {
                StepOutcome::Extracted { requested, record } => {
                    if self.frontier.is_visited(&requested) {
                        // An earlier redirect already recorded this page
                        tracing::debug!("{} was reached by a redirect, skipping", requested);
                        self.frontier.mark_visited(&requested);
                        stats.processed += 1;
                        self.emit(stats.processed, &requested, ProgressStatus::Success, None);
                        continue;
                    }

                    self.frontier.mark_visited(&requested);
                    if record.url != requested {
                        tracing::debug!("{} redirected to {}", requested, record.url);
                        self.frontier.mark_redirect_target(&record.url);
                    }

                    let filters = &self.filters;
                    let added = self.frontier.discover(&record.links, |url| filters.matches(url));
                    tracing::trace!("{} queued {} new link(s)", requested, added);

                    stats.processed += 1;
                    stats.succeeded += 1;
                    result.insert(requested.clone(), record);
                    self.emit(stats.processed, &requested, ProgressStatus::Success, None);
                }
                StepOutcome::Failed { requested, error } => {
                    tracing::warn!("Failed to extract {}: {}", requested, error);
                    self.frontier.mark_failed(&requested);

                    stats.processed += 1;
                    stats.failed += 1;
                    self.emit(
                        stats.processed,
                        &requested,
                        ProgressStatus::Error,
                        Some(error.to_string()),
                    );
                }
                StepOutcome::Abandoned { requested } => {
                    tracing::trace!("Abandoned {} on cancellation", requested);
                    self.frontier.requeue(&requested);
                }
            }
        }
    }

    fn emit(&self, processed: usize, current_url: &str, status: ProgressStatus, error: Option<String>) {
        let Some(callback) = &self.progress else {
            return;
        };

        let pending = self.frontier.pending_len();
        callback(&CrawlProgress {
            processed,
            pending,
            total: processed + pending + self.frontier.in_flight_len(),
            current_url: current_url.to_string(),
            status: Some(status),
            error,
        });
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(TrawlerError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Processes one URL in its own background tab
async fn process_url<B: Browser + ?Sized>(
    tabs: &TabController<B>,
    url: String,
    request: &ProbeRequest,
    delay: Duration,
    cancel: CancellationToken,
) -> StepOutcome {
    if !delay.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => return StepOutcome::Abandoned { requested: url },
        }
    }

    let extracted = tabs
        .with_tab(&url, |tab| tabs.browser().inject_probe(tab, request))
        .await
        .and_then(|frames| first_frame(frames, &url));

    match extracted {
        Ok(record) => StepOutcome::Extracted {
            requested: url,
            record,
        },
        Err(error) => StepOutcome::Failed {
            requested: url,
            error,
        },
    }
}

/// The core only uses the first frame's result
fn first_frame(frames: Vec<PageRecord>, url: &str) -> Result<PageRecord> {
    frames.into_iter().next().ok_or_else(|| TrawlerError::Injection {
        url: url.to_string(),
        message: "probe returned no result".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::{MockBrowser, MockPage};
    use std::sync::Mutex;

    const SEED: &str = "https://a.com/";

    fn page(links: &[&str]) -> MockPage {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{}">link</a>"#, l))
            .collect();
        MockPage::html(&format!(
            "<html><head><title>Page</title></head><body><h1>Page</h1>{}</body></html>",
            anchors
        ))
    }

    fn options() -> CrawlOptions {
        CrawlOptions {
            navigation_timeout: Duration::from_millis(200),
            ..CrawlOptions::default()
        }
    }

    fn coordinator(browser: &Arc<MockBrowser>) -> Coordinator<MockBrowser> {
        Coordinator::new(browser.clone(), options())
    }

    fn record_progress(coordinator: &mut Coordinator<MockBrowser>) -> Arc<Mutex<Vec<CrawlProgress>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        coordinator.on_progress(move |p| sink.lock().unwrap().push(p.clone()));
        events
    }

    #[tokio::test]
    async fn test_full_crawl() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/1", "/2", "https://b.com/z"]))
                .with_page("https://a.com/1", page(&["/3", "/"]))
                .with_page("https://a.com/2", page(&["/1"]))
                .with_page("https://a.com/3", page(&[])),
        );
        let mut crawler = coordinator(&browser);

        let outcome = crawler.start().await.unwrap();

        assert_eq!(outcome.status, CrawlPhase::Completed);
        assert_eq!(crawler.phase(), CrawlPhase::Completed);
        let keys: Vec<_> = outcome.result.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![SEED, "https://a.com/1", "https://a.com/2", "https://a.com/3"]
        );
        assert_eq!(outcome.stats.processed, 4);
        assert_eq!(outcome.stats.failed, 0);
        assert_eq!(browser.created(), 3);
        assert_eq!(browser.created(), browser.removed());
    }

    #[tokio::test]
    async fn test_filters_gate_discovery() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/blog/post1", "/shop/item"]))
                .with_page("https://a.com/blog/post1", page(&[])),
        );
        let mut crawler =
            coordinator(&browser).with_filters(FilterSnapshot::new(["blog"]));

        let outcome = crawler.start().await.unwrap();

        assert!(outcome.result.contains_key("https://a.com/blog/post1"));
        assert!(!outcome.result.contains_key("https://a.com/shop/item"));
        assert_eq!(browser.requests(), vec!["https://a.com/blog/post1"]);
    }

    #[tokio::test]
    async fn test_seed_is_not_filtered() {
        let browser = Arc::new(MockBrowser::new(SEED).with_page(SEED, page(&[])));
        let mut crawler =
            coordinator(&browser).with_filters(FilterSnapshot::new(["nothing-matches"]));

        let outcome = crawler.start().await.unwrap();
        assert_eq!(outcome.result.len(), 1);
    }

    #[tokio::test]
    async fn test_no_active_tab() {
        let browser = Arc::new(MockBrowser::without_active_tab());
        let mut crawler = coordinator(&browser);

        let result = crawler.start().await;

        assert!(matches!(result, Err(TrawlerError::NoActiveTab)));
        assert_eq!(crawler.phase(), CrawlPhase::Failed);
        assert_eq!(browser.created(), 0);
    }

    #[tokio::test]
    async fn test_slow_seed_times_out() {
        let browser = Arc::new(MockBrowser::new(SEED).with_page(SEED, MockPage::Hang));
        let mut crawler = coordinator(&browser);

        let result = tokio::time::timeout(Duration::from_secs(2), crawler.start())
            .await
            .expect("seed extraction was not bounded");

        match result {
            Err(TrawlerError::SeedExtraction { url, reason }) => {
                assert_eq!(url, SEED);
                assert!(reason.contains("200ms"), "reason: {}", reason);
            }
            other => panic!("unexpected result: {:?}", other.map(|o| o.status)),
        }
        assert_eq!(crawler.phase(), CrawlPhase::Failed);
    }

    #[tokio::test]
    async fn test_seed_extraction_failure() {
        let browser = Arc::new(MockBrowser::new(SEED).with_page(SEED, MockPage::InjectError));
        let mut crawler = coordinator(&browser);

        let result = crawler.start().await;

        assert!(matches!(result, Err(TrawlerError::SeedExtraction { .. })));
        assert_eq!(crawler.phase(), CrawlPhase::Failed);
        assert_eq!(browser.created(), 0);
    }

    #[tokio::test]
    async fn test_per_url_failures_do_not_stop_the_crawl() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/broken", "/slow", "/noinject", "/ok"]))
                .with_page("https://a.com/broken", MockPage::LoadError)
                .with_page("https://a.com/slow", MockPage::Hang)
                .with_page("https://a.com/noinject", MockPage::InjectError)
                .with_page("https://a.com/ok", page(&[])),
        );
        let mut crawler = coordinator(&browser);
        let events = record_progress(&mut crawler);

        let outcome = crawler.start().await.unwrap();

        assert_eq!(outcome.status, CrawlPhase::Completed);
        let keys: Vec<_> = outcome.result.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![SEED, "https://a.com/ok"]);
        assert_eq!(outcome.stats.failed, 3);
        assert_eq!(outcome.stats.tabs_opened, outcome.stats.tabs_closed);
        assert_eq!(browser.created(), browser.removed());

        let events = events.lock().unwrap();
        let errors: Vec<_> = events.iter().filter(|p| p.is_error()).collect();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|p| p.error.is_some()));
        assert!(errors[1].error.as_deref().unwrap().contains("Timed out"));
    }

    #[tokio::test]
    async fn test_failed_urls_are_not_retried() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/bad", "/2"]))
                .with_page("https://a.com/bad", MockPage::LoadError)
                .with_page("https://a.com/2", page(&["/bad"])),
        );
        let mut crawler = coordinator(&browser);

        crawler.start().await.unwrap();

        assert_eq!(browser.requests(), vec!["https://a.com/bad", "https://a.com/2"]);
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_results() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/1", "/2", "/3", "/4", "/5"]))
                .with_page("https://a.com/1", page(&[]))
                .with_page("https://a.com/2", page(&[]))
                .with_page("https://a.com/3", page(&[]))
                .with_page("https://a.com/4", page(&[]))
                .with_page("https://a.com/5", page(&[])),
        );
        let mut crawler = coordinator(&browser);
        let cancel = crawler.cancel_handle();
        crawler.on_progress(move |p| {
            if p.processed == 3 {
                cancel.cancel();
            }
        });

        let outcome = crawler.start().await.unwrap();

        assert_eq!(outcome.status, CrawlPhase::Cancelled);
        let keys: Vec<_> = outcome.result.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![SEED, "https://a.com/1", "https://a.com/2"]);
        assert_eq!(outcome.stats.remaining, 3);
        assert_eq!(browser.created(), 2);
        assert_eq!(browser.created(), browser.removed());
    }

    #[tokio::test]
    async fn test_cancel_lets_in_flight_steps_finish() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/1", "/2", "/3", "/4"]))
                .with_page("https://a.com/1", page(&[]))
                .with_page("https://a.com/2", page(&[]))
                .with_page("https://a.com/3", page(&[]))
                .with_page("https://a.com/4", page(&[]))
                .with_load_delay(Duration::from_millis(20)),
        );
        let options = CrawlOptions {
            max_concurrent: 2,
            ..options()
        };
        let mut crawler = Coordinator::new(browser.clone(), options);
        let cancel = crawler.cancel_handle();
        crawler.on_progress(move |p| {
            if p.processed == 2 {
                cancel.cancel();
            }
        });

        let outcome = crawler.start().await.unwrap();

        // Both steps dispatched before the cancel are recorded
        assert_eq!(outcome.status, CrawlPhase::Cancelled);
        assert_eq!(outcome.result.len(), 3);
        assert_eq!(browser.created(), 2);
        assert_eq!(browser.created(), browser.removed());
    }

    #[tokio::test]
    async fn test_redirect_marks_both_urls_visited() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/old", "/new"]))
                .with_page(
                    "https://a.com/old",
                    MockPage::redirect("https://a.com/new", "<h1>New</h1>"),
                )
                .with_page("https://a.com/new", page(&[])),
        );
        let mut crawler = coordinator(&browser);

        let outcome = crawler.start().await.unwrap();

        assert_eq!(browser.requests(), vec!["https://a.com/old"]);
        assert_eq!(outcome.result["https://a.com/old"].url, "https://a.com/new");
        assert!(crawler.frontier().is_visited("https://a.com/new"));
    }

    #[tokio::test]
    async fn test_redirect_onto_in_flight_url_is_recorded_once() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/old", "/new"]))
                .with_page(
                    "https://a.com/old",
                    MockPage::redirect("https://a.com/new", "<h1>New</h1>"),
                )
                .with_page("https://a.com/new", page(&[]))
                .with_page_delay("https://a.com/new", Duration::from_millis(100)),
        );
        let mut crawler = Coordinator::new(
            browser.clone(),
            CrawlOptions {
                max_concurrent: 2,
                ..options()
            },
        );
        let events = record_progress(&mut crawler);

        let outcome = crawler.start().await.unwrap();

        assert_eq!(browser.created(), 2);
        let keys: Vec<_> = outcome.result.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![SEED, "https://a.com/old"]);
        assert_eq!(outcome.stats.processed, 3);
        assert_eq!(outcome.stats.succeeded, 2);
        assert_eq!(crawler.frontier().in_flight_len(), 0);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        let totals: Vec<usize> = events.iter().map(|e| e.total).collect();
        assert!(totals.windows(2).all(|w| w[0] <= w[1]), "totals: {:?}", totals);
        assert_eq!(events[1].total, 3);
    }

    #[tokio::test]
    async fn test_seed_is_keyed_by_its_own_location() {
        let browser = Arc::new(
            MockBrowser::new("https://a.com/start")
                .with_page(
                    "https://a.com/start",
                    MockPage::redirect("https://a.com/home", r#"<a href="/start">s</a>"#),
                ),
        );
        let mut crawler = coordinator(&browser);

        let outcome = crawler.start().await.unwrap();

        assert!(outcome.result.contains_key("https://a.com/home"));
        // The tab URL counts as visited too
        assert_eq!(browser.created(), 0);
    }

    #[tokio::test]
    async fn test_bounded_concurrency() {
        let links: Vec<String> = (1..=6).map(|i| format!("/{}", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut browser = MockBrowser::new(SEED)
            .with_page(SEED, page(&link_refs))
            .with_load_delay(Duration::from_millis(20));
        for i in 1..=6 {
            browser = browser.with_page(&format!("https://a.com/{}", i), page(&[]));
        }
        let browser = Arc::new(browser);

        let options = CrawlOptions {
            max_concurrent: 3,
            ..options()
        };
        let mut crawler = Coordinator::new(browser.clone(), options);

        let outcome = crawler.start().await.unwrap();

        assert_eq!(outcome.result.len(), 7);
        assert!(browser.max_open() <= 3);
        assert!(browser.max_open() > 1);
    }

    #[tokio::test]
    async fn test_request_delay_between_opens() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/1", "/2", "/3"]))
                .with_page("https://a.com/1", page(&[]))
                .with_page("https://a.com/2", page(&[]))
                .with_page("https://a.com/3", page(&[])),
        );
        let options = CrawlOptions {
            request_delay: Duration::from_millis(30),
            ..options()
        };
        let mut crawler = Coordinator::new(browser.clone(), options);

        let outcome = crawler.start().await.unwrap();

        assert_eq!(outcome.result.len(), 4);
        assert!(outcome.stats.elapsed >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_progress_counts() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/1", "/2"]))
                .with_page("https://a.com/1", page(&[]))
                .with_page("https://a.com/2", page(&[])),
        );
        let mut crawler = coordinator(&browser);
        let events = record_progress(&mut crawler);

        crawler.start().await.unwrap();

        let events = events.lock().unwrap();
        let processed: Vec<_> = events.iter().map(|p| p.processed).collect();
        assert_eq!(processed, vec![1, 2, 3]);
        assert_eq!(events[0].current_url, SEED);
        assert_eq!(events[0].pending, 2);
        assert_eq!(events[0].total, 3);

        let last = events.last().unwrap();
        assert_eq!(last.pending, 0);
        assert_eq!(last.total, 3);
        assert_eq!(last.status, Some(ProgressStatus::Success));
    }

    #[tokio::test]
    async fn test_coordinator_can_run_again() {
        let browser = Arc::new(
            MockBrowser::new(SEED)
                .with_page(SEED, page(&["/1"]))
                .with_page("https://a.com/1", page(&[])),
        );
        let mut crawler = coordinator(&browser);

        let first = crawler.start().await.unwrap();
        crawler.cancel();
        let second = crawler.start().await.unwrap();

        assert_eq!(first.result, second.result);
        assert_eq!(second.status, CrawlPhase::Completed);
        assert_eq!(browser.created(), 2);
    }

    #[tokio::test]
    async fn test_selectors_are_passed_to_the_probe() {
        let browser = Arc::new(MockBrowser::new(SEED).with_page(
            SEED,
            MockPage::html(r#"<div class="price">$10</div>"#),
        ));
        let mut crawler =
            coordinator(&browser).with_selectors(vec![".price".to_string(), "):::bad".to_string()]);

        let outcome = crawler.start().await.unwrap();
        let seed = &outcome.result[SEED];

        assert!(!seed.custom_selector_results[".price"].is_error());
        assert!(seed.custom_selector_results["):::bad"].is_error());
    }
}
