//! Summary report: totals and per-page counts

use crate::crawler::CrawlResult;
use crate::probe::{IssueKind, SelectorOutcome};
use indexmap::IndexMap;
use serde::Serialize;

/// Totals over a whole crawl result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub total_pages: usize,
    pub total_headings: usize,
    pub total_internal_links: usize,
    pub pages: Vec<PageSummary>,
    pub seo: SeoSummary,
}

/// Counts for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub headings_count: usize,
    pub internal_links_count: usize,
    pub custom_selectors: IndexMap<String, SelectorOutcome>,
}

/// Heading, image and SEO issue totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoSummary {
    pub pages_without_h1: usize,
    pub pages_with_multiple_h1: usize,
    pub empty_headings: usize,
    pub total_images: usize,
    pub images_without_alt: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub total_word_count: u64,
    /// Mean `loadTime` over pages that report one, in milliseconds
    pub average_load_time: u64,
}

/// Computes the summary report of a crawl result
pub fn summarize(result: &CrawlResult) -> CrawlSummary {
    let mut seo = SeoSummary::default();
    let mut load_times = Vec::new();

    for record in result.values() {
        match record.headings.iter().filter(|h| h.tag == "h1").count() {
            0 => seo.pages_without_h1 += 1,
            1 => {}
            _ => seo.pages_with_multiple_h1 += 1,
        }
        seo.empty_headings += record.headings.iter().filter(|h| h.is_empty).count();

        if let Some(images) = &record.images {
            seo.total_images += images.len();
            seo.images_without_alt += images.iter().filter(|i| !i.has_alt).count();
        }
        if let Some(issues) = &record.seo_issues {
            seo.error_count += issues.iter().filter(|i| i.kind == IssueKind::Error).count();
            seo.warning_count += issues.iter().filter(|i| i.kind == IssueKind::Warning).count();
        }
        seo.total_word_count += record.word_count.unwrap_or(0);
        load_times.extend(record.load_time);
    }

    if !load_times.is_empty() {
        seo.average_load_time = load_times.iter().sum::<u64>() / load_times.len() as u64;
    }

    CrawlSummary {
        total_pages: result.len(),
        total_headings: result.values().map(|r| r.headings.len()).sum(),
        total_internal_links: result.values().map(|r| r.links.len()).sum(),
        pages: result
            .iter()
            .map(|(url, record)| PageSummary {
                url: url.clone(),
                title: record.title.clone(),
                headings_count: record.headings.len(),
                internal_links_count: record.links.len(),
                custom_selectors: record.custom_selector_results.clone(),
            })
            .collect(),
        seo,
    }
}
