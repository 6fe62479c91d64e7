use serde::Deserialize;

/// Main configuration structure for Page-Trawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Crawl loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// How long to wait for a background tab to finish loading (milliseconds)
    #[serde(rename = "navigation-timeout", default = "default_navigation_timeout")]
    pub navigation_timeout: u64,

    /// Fixed delay before each tab open after the first (milliseconds)
    #[serde(rename = "request-delay", default)]
    pub request_delay: u64,

    /// Maximum number of crawl steps with a tab open at the same time
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: default_navigation_timeout(),
            request_delay: 0,
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_navigation_timeout() -> u64 {
    30_000
}

fn default_max_concurrent() -> u32 {
    1
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// What the extraction probe collects beyond the core page record
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Collect meta extensions, images, word count and SEO issues
    #[serde(rename = "collect-seo", default = "default_true")]
    pub collect_seo: bool,

    /// Keep whitespace verbatim when flattening custom-selector content
    #[serde(rename = "preserve-whitespace", default)]
    pub preserve_whitespace: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            collect_seo: true,
            preserve_whitespace: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database holding registries and crawl results
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Report format used when none is given on the command line
    #[serde(default)]
    pub format: Option<String>,
}
