//! SEO signals: social metadata, images, word count and page-level issues

use crate::probe::record::{Heading, ImageInfo, PageMeta, SeoIssue};
use scraper::node::Node;
use scraper::{Html, Selector};

/// Recommended `<title>` length range, in characters
pub const TITLE_LENGTH: std::ops::RangeInclusive<usize> = 30..=60;

/// Recommended meta description length range, in characters
pub const DESCRIPTION_LENGTH: std::ops::RangeInclusive<usize> = 120..=160;

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Collects OpenGraph, Twitter card, canonical and robots metadata
pub fn collect_meta(document: &Html) -> PageMeta {
    let canonical = Selector::parse(r#"link[rel="canonical"]"#)
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .filter_map(|el| el.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty())
                .map(str::to_string)
        });

    PageMeta {
        og_title: meta_content(document, r#"meta[property="og:title"]"#),
        og_description: meta_content(document, r#"meta[property="og:description"]"#),
        og_image: meta_content(document, r#"meta[property="og:image"]"#),
        og_type: meta_content(document, r#"meta[property="og:type"]"#),
        twitter_card: meta_content(document, r#"meta[name="twitter:card"]"#),
        twitter_title: meta_content(document, r#"meta[name="twitter:title"]"#),
        twitter_description: meta_content(document, r#"meta[name="twitter:description"]"#),
        twitter_image: meta_content(document, r#"meta[name="twitter:image"]"#),
        canonical,
        robots: meta_content(document, r#"meta[name="robots"]"#),
    }
}

/// Lists every `<img>` in document order
pub fn collect_images(document: &Html) -> Vec<ImageInfo> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .enumerate()
        .map(|(i, img)| {
            let attrs = img.value();
            let alt = attrs.attr("alt").map(str::trim).unwrap_or("");
            ImageInfo {
                src: attrs.attr("src").unwrap_or("").to_string(),
                alt: alt.to_string(),
                has_alt: !alt.is_empty(),
                width: attrs.attr("width").and_then(|w| w.trim().parse().ok()),
                height: attrs.attr("height").and_then(|h| h.trim().parse().ok()),
                position: i + 1,
            }
        })
        .collect()
}

/// Counts whitespace-separated words of the body text, ignoring scripts and styles
pub fn count_words(document: &Html) -> u64 {
    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    root.descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    matches!(
                        a.value(),
                        Node::Element(el) if matches!(el.name(), "script" | "style" | "noscript" | "template")
                    )
                });
                (!hidden).then(|| text.split_whitespace().count() as u64)
            }
            _ => None,
        })
        .sum()
}

/// Evaluates page-level SEO rules
pub fn find_issues(
    title: &str,
    description: &str,
    headings: &[Heading],
    images: &[ImageInfo],
    meta: &PageMeta,
) -> Vec<SeoIssue> {
    let mut issues = Vec::new();

    let title_len = title.chars().count();
    if title_len == 0 {
        issues.push(SeoIssue::error("Missing page title"));
    } else if !TITLE_LENGTH.contains(&title_len) {
        issues.push(SeoIssue::warning(format!(
            "Title length is {} characters (recommended {}-{})",
            title_len,
            TITLE_LENGTH.start(),
            TITLE_LENGTH.end()
        )));
    }

    let description_len = description.chars().count();
    if description_len == 0 {
        issues.push(SeoIssue::error("Missing meta description"));
    } else if !DESCRIPTION_LENGTH.contains(&description_len) {
        issues.push(SeoIssue::warning(format!(
            "Meta description length is {} characters (recommended {}-{})",
            description_len,
            DESCRIPTION_LENGTH.start(),
            DESCRIPTION_LENGTH.end()
        )));
    }

    let h1_count = headings.iter().filter(|h| h.tag == "h1").count();
    match h1_count {
        0 => issues.push(SeoIssue::error("No H1 heading")),
        1 => {}
        n => issues.push(SeoIssue::warning(format!("Multiple H1 headings ({})", n))),
    }

    let empty = headings.iter().filter(|h| h.is_empty).count();
    if empty > 0 {
        issues.push(SeoIssue::warning(format!("{} empty heading(s)", empty)));
    }

    let without_alt = images.iter().filter(|img| !img.has_alt).count();
    if without_alt > 0 {
        issues.push(SeoIssue::warning(format!(
            "{} image(s) without alt text",
            without_alt
        )));
    }

    if meta.canonical.is_none() {
        issues.push(SeoIssue::warning("Missing canonical link"));
    }

    issues
}
