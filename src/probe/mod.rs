//! Extraction probe
//!
//! Reads a loaded document and produces a [`PageRecord`]. The probe never
//! fails: malformed links are dropped and each custom selector is evaluated in
//! isolation, so a selector that cannot be parsed only records an error marker
//! under its own key.

pub mod markdown;
pub mod record;
pub mod seo;

pub use markdown::{flatten_to_markdown, format_element, FlattenOptions};
pub use record::{
    ExtractedContent, Heading, ImageInfo, IssueKind, PageMeta, PageRecord, SelectorOutcome,
    SeoIssue,
};

use crate::url::{is_same_origin, resolve_href};
use indexmap::{IndexMap, IndexSet};
use scraper::{Html, Selector};
use url::Url;

/// Options controlling what the probe collects
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Collect meta extensions, images, word count and SEO issues
    pub collect_seo: bool,

    /// Keep whitespace verbatim when flattening selector matches
    pub preserve_whitespace: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            collect_seo: true,
            preserve_whitespace: false,
        }
    }
}

/// Arguments passed to the probe when it is injected into a page
#[derive(Debug, Clone, Default)]
pub struct ProbeRequest {
    /// Custom CSS selectors, evaluated in order
    pub selectors: Vec<String>,
    pub options: ProbeOptions,
}

impl ProbeRequest {
    pub fn new(selectors: Vec<String>, options: ProbeOptions) -> Self {
        Self { selectors, options }
    }
}

/// Extracts a [`PageRecord`] from an HTML document
///
/// # Arguments
///
/// * `html` - The document source
/// * `page_url` - The page's own location, used as the origin for link filtering
/// * `request` - Custom selectors and collection options
///
/// # Returns
///
/// The record for the page. `load_time` is left unset for the caller to fill.
pub fn extract_page(html: &str, page_url: &Url, request: &ProbeRequest) -> PageRecord {
    let document = Html::parse_document(html);
    let mut record = PageRecord::new(page_url.as_str());

    record.title = extract_title(&document);
    record.description = extract_description(&document);
    record.headings = extract_headings(&document);
    record.links = extract_links(&document, page_url);
    record.custom_selector_results = extract_selectors(&document, request);

    if request.options.collect_seo {
        let meta = seo::collect_meta(&document);
        let images = seo::collect_images(&document);
        record.seo_issues = Some(seo::find_issues(
            &record.title,
            &record.description,
            &record.headings,
            &images,
            &meta,
        ));
        record.word_count = Some(seo::count_words(&document));
        record.meta = Some(meta);
        record.images = Some(images);
    }

    record
}

fn extract_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_description(document: &Html) -> String {
    Selector::parse(r#"meta[name="description"]"#)
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .enumerate()
        .map(|(i, el)| {
            let text = el.text().collect::<String>().trim().to_string();
            Heading {
                tag: el.value().name().to_lowercase(),
                is_empty: text.is_empty(),
                text,
                position: i + 1,
            }
        })
        .collect()
}

/// Resolves the relative-URL base, honouring `<base href>`
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve_href(href, page_url).ok())
        .unwrap_or_else(|| page_url.clone())
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = document_base(document, page_url);

    let mut links = IndexSet::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        match resolve_href(href, &base) {
            Ok(url) if is_same_origin(page_url, &url) => {
                links.insert(url.to_string());
            }
            Ok(_) => {}
            Err(e) => tracing::trace!("Dropping anchor on {}: {}", page_url, e),
        }
    }

    links.into_iter().collect()
}

fn extract_selectors(document: &Html, request: &ProbeRequest) -> IndexMap<String, SelectorOutcome> {
    let flatten = FlattenOptions {
        preserve_whitespace: request.options.preserve_whitespace,
    };
    let mut results = IndexMap::new();

    for css in &request.selectors {
        let selector = match Selector::parse(css) {
            Ok(selector) => selector,
            Err(e) => {
                results.insert(
                    css.clone(),
                    SelectorOutcome::Error {
                        error: e.to_string(),
                    },
                );
                continue;
            }
        };

        let matches: Vec<ExtractedContent> = document
            .select(&selector)
            .filter_map(|el| format_element(el, flatten))
            .collect();

        if !matches.is_empty() {
            results.insert(css.clone(), SelectorOutcome::Matches(matches));
        }
    }

    results
}
