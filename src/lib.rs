//! Page-Trawler: a same-origin site extractor
//!
//! This crate crawls the pages reachable from a starting page on the same host,
//! extracts headings, links, metadata and custom-selector content from each one,
//! and renders the aggregated result as JSON or CSV reports.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod probe;
pub mod registry;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Page-Trawler operations
#[derive(Debug, Error)]
pub enum TrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No active tab found")]
    NoActiveTab,

    #[error("Failed to extract data from the starting page {url}: {reason}")]
    SeedExtraction { url: String, reason: String },

    #[error("Timed out after {timeout_ms}ms waiting for {url} to load")]
    TabTimeout { url: String, timeout_ms: u64 },

    #[error("Failed to open a tab for {url}: {message}")]
    TabCreate { url: String, message: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("No tab with id {0}")]
    TabNotFound(u64),

    #[error("Extraction probe could not run in {url}: {message}")]
    Injection { url: String, message: String },

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
///
/// These never leave the extraction probe: an anchor whose `href` produces one
/// of these is dropped from the page's link set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Page-Trawler operations
pub type Result<T> = std::result::Result<T, TrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlOutcome, CrawlProgress, CrawlResult, ProgressStatus};
pub use probe::{PageRecord, SelectorOutcome};
pub use state::{CrawlPhase, Frontier};
