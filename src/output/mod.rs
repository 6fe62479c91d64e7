//! Output module for rendering crawl results as reports
//!
//! This module handles:
//! - Projecting a CrawlResult into summary JSON, raw JSON or CSV reports
//! - Saving and restoring the last result and the last-used format

mod persist;
mod summary;
mod tabular;

pub use persist::{clear_saved_result, load_format, load_result, save_format, save_result};
pub use summary::{summarize, CrawlSummary, PageSummary, SeoSummary};

use crate::crawler::CrawlResult;
use crate::storage::StorageError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Pretty JSON with totals and per-page counts
    #[default]
    Summary,
    /// `page,index,headingTag,headingLevel,content`
    Headings,
    /// `page,title,description`
    Meta,
    /// `page,link`
    Links,
    /// `page,selector,index,text,html,error`
    Selectors,
    /// The raw CrawlResult as pretty JSON
    Json,
}

impl OutputFormat {
    pub fn all() -> [OutputFormat; 6] {
        [
            Self::Summary,
            Self::Headings,
            Self::Meta,
            Self::Links,
            Self::Selectors,
            Self::Json,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Headings => "headings",
            Self::Meta => "meta",
            Self::Links => "links",
            Self::Selectors => "selectors",
            Self::Json => "json",
        }
    }

    /// True for the formats rendered as CSV
    pub fn is_csv(&self) -> bool {
        matches!(
            self,
            Self::Headings | Self::Meta | Self::Links | Self::Selectors
        )
    }

    /// File extension for exported reports
    pub fn extension(&self) -> &'static str {
        if self.is_csv() {
            "csv"
        } else {
            "json"
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| OutputError::UnknownFormat(s.to_string()))
    }
}

/// Renders a crawl result in the given format
///
/// # Arguments
///
/// * `result` - The crawl result to project
/// * `format` - The report format
///
/// # Returns
///
/// * `Ok(String)` - The rendered report
/// * `Err(OutputError)` - Serialization failed
pub fn render(result: &CrawlResult, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Summary => Ok(serde_json::to_string_pretty(&summarize(result))?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Headings => tabular::headings_csv(result),
        OutputFormat::Meta => tabular::meta_csv(result),
        OutputFormat::Links => tabular::links_csv(result),
        OutputFormat::Selectors => tabular::selectors_csv(result),
    }
}
