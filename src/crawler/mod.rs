//! Crawler module for same-origin site extraction
//!
//! This module contains the core crawling logic, including:
//! - The crawl coordinator and its state machine
//! - Progress events and run statistics
//! - Crawl options derived from the configuration

mod coordinator;
mod progress;

pub use coordinator::{Coordinator, CrawlOutcome, ProgressCallback};
pub use progress::{CrawlProgress, CrawlStats, ProgressStatus};

use crate::config::Config;
use crate::probe::{PageRecord, ProbeOptions};
use indexmap::IndexMap;
use std::time::Duration;

/// Mapping from URL to the page record extracted for it, in completion order
///
/// Pages are keyed by the URL that was requested; the start page is keyed by
/// its own reported location.
pub type CrawlResult = IndexMap<String, PageRecord>;

/// Typed crawl options
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Upper bound on the wait for one tab to finish loading
    pub navigation_timeout: Duration,

    /// Fixed delay before every tab open except the first
    pub request_delay: Duration,

    /// Crawl steps allowed to hold a tab at the same time
    pub max_concurrent: usize,

    pub probe: ProbeOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_millis(30_000),
            request_delay: Duration::ZERO,
            max_concurrent: 1,
            probe: ProbeOptions::default(),
        }
    }
}

impl CrawlOptions {
    /// Builds crawl options from a validated configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation_timeout: Duration::from_millis(config.crawler.navigation_timeout),
            request_delay: Duration::from_millis(config.crawler.request_delay),
            max_concurrent: config.crawler.max_concurrent.max(1) as usize,
            probe: ProbeOptions {
                collect_seo: config.extraction.collect_seo,
                preserve_whitespace: config.extraction.preserve_whitespace,
            },
        }
    }
}
