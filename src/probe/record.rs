//! Page record types produced by the extraction probe
//!
//! These are the serialized shape of a crawl result: a JSON object keyed by
//! URL whose values are [`PageRecord`]s. Field names are camelCase on the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Structured extraction result for one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// The page's own reported location (after redirects)
    pub url: String,

    /// Contents of `<title>`, possibly empty
    #[serde(default)]
    pub title: String,

    /// Contents of `<meta name="description">`, possibly empty
    #[serde(default)]
    pub description: String,

    /// Headings in document order
    #[serde(default)]
    pub headings: Vec<Heading>,

    /// Same-origin absolute URLs found on the page, without duplicates
    #[serde(default)]
    pub links: Vec<String>,

    /// Per-selector extracted content, in selector order
    #[serde(
        rename = "customSelectors",
        alias = "customSelectorResults",
        default
    )]
    pub custom_selector_results: IndexMap<String, SelectorOutcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageInfo>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_issues: Option<Vec<SeoIssue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,

    /// Time from tab open to load complete, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_time: Option<u64>,
}

impl PageRecord {
    /// Creates an empty record for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            description: String::new(),
            headings: Vec::new(),
            links: Vec::new(),
            custom_selector_results: IndexMap::new(),
            meta: None,
            images: None,
            seo_issues: None,
            word_count: None,
            load_time: None,
        }
    }
}

/// One `h1`..`h6` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// Lowercase tag name, `h1` through `h6`
    pub tag: String,

    /// Trimmed text content
    pub text: String,

    /// 1-based index among all headings on the page
    pub position: usize,

    /// True iff `text` is empty
    pub is_empty: bool,
}

impl Heading {
    /// Numeric level of the heading (1 for `h1`)
    pub fn level(&self) -> u8 {
        self.tag
            .strip_prefix('h')
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

/// Result of evaluating one custom CSS selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorOutcome {
    /// The selector matched and produced non-empty content
    Matches(Vec<ExtractedContent>),

    /// The selector could not be evaluated
    Error { error: String },
}

impl SelectorOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Content extracted from one element matched by a custom selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Markdown-like flattening of the element
    pub text: String,

    /// Outer HTML of the element
    pub html: String,
}

/// OpenGraph, Twitter card, canonical and robots metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robots: Option<String>,
}

/// One `<img>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub has_alt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// 1-based index among all images on the page
    pub position: usize,
}

/// Severity of an SEO finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
}

/// One SEO finding for a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
}

impl SeoIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Warning,
            message: message.into(),
        }
    }
}
