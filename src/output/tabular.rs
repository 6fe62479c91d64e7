//! CSV projections of a crawl result
//!
//! Every field is quoted, with line breaks and whitespace runs collapsed to
//! single spaces.

use crate::crawler::CrawlResult;
use crate::output::{OutputError, OutputResult};
use crate::probe::SelectorOutcome;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> OutputResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Format(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Format(e.to_string()))
}

/// Collapses line breaks and whitespace runs, then trims
fn sanitize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `page,index,headingTag,headingLevel,content`
pub fn headings_csv(result: &CrawlResult) -> OutputResult<String> {
    let mut out = writer();
    out.write_record(["page", "index", "headingTag", "headingLevel", "content"])?;

    for (page, record) in result {
        let page = sanitize(page);
        for (i, heading) in record.headings.iter().enumerate() {
            out.write_record([
                page.clone(),
                (i + 1).to_string(),
                heading.tag.clone(),
                heading.level().to_string(),
                sanitize(&heading.text),
            ])?;
        }
    }

    finish(out)
}

/// `page,title,description`
pub fn meta_csv(result: &CrawlResult) -> OutputResult<String> {
    let mut out = writer();
    out.write_record(["page", "title", "description"])?;

    for (page, record) in result {
        out.write_record([
            sanitize(page),
            sanitize(&record.title),
            sanitize(&record.description),
        ])?;
    }

    finish(out)
}

/// `page,link`
pub fn links_csv(result: &CrawlResult) -> OutputResult<String> {
    let mut out = writer();
    out.write_record(["page", "link"])?;

    for (page, record) in result {
        let page = sanitize(page);
        for link in &record.links {
            out.write_record([page.as_str(), sanitize(link).as_str()])?;
        }
    }

    finish(out)
}

/// `page,selector,index,text,html,error`
///
/// One row per extracted element; a selector that failed yields one row with
/// only `error` filled.
pub fn selectors_csv(result: &CrawlResult) -> OutputResult<String> {
    let mut out = writer();
    out.write_record(["page", "selector", "index", "text", "html", "error"])?;

    for (page, record) in result {
        let page = sanitize(page);
        for (selector, outcome) in &record.custom_selector_results {
            match outcome {
                SelectorOutcome::Matches(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.write_record([
                            page.clone(),
                            sanitize(selector),
                            (i + 1).to_string(),
                            sanitize(&item.text),
                            sanitize(&item.html),
                            String::new(),
                        ])?;
                    }
                }
                SelectorOutcome::Error { error } => {
                    out.write_record([
                        page.clone(),
                        sanitize(selector),
                        String::new(),
                        String::new(),
                        String::new(),
                        sanitize(error),
                    ])?;
                }
            }
        }
    }

    finish(out)
}
