//! Progress events emitted while a crawl runs

use serde::Serialize;
use std::time::Duration;

/// Outcome of the URL a progress event reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Success,
    Error,
}

/// One progress event, emitted after each URL completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlProgress {
    /// URLs completed so far, successes and failures, seed included
    pub processed: usize,

    /// URLs discovered but not yet handed out
    pub pending: usize,

    /// `processed` plus `pending` plus URLs currently in flight
    pub total: usize,

    /// The URL that just completed
    pub current_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProgressStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlProgress {
    pub fn is_error(&self) -> bool {
        self.status == Some(ProgressStatus::Error)
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// URLs completed, seed included
    pub processed: usize,

    /// URLs that produced a page record
    pub succeeded: usize,

    /// URLs that failed and were not retried
    pub failed: usize,

    /// URLs still pending when the run ended
    pub remaining: usize,

    pub tabs_opened: usize,
    pub tabs_closed: usize,
    pub elapsed: Duration,
}
