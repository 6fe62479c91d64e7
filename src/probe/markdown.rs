//! Markdown-like flattening of HTML elements
//!
//! Custom-selector matches are rendered as readable text rather than raw
//! `textContent`: headings become `#` lines, emphasis and links keep their
//! inline markers, lists and tables keep their structure, and block elements
//! are separated by blank lines.
//!
//! The walk uses an explicit stack of frames so arbitrarily deep documents
//! cannot overflow the call stack. The DOM is only read.

use crate::probe::record::ExtractedContent;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Flattening options
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    /// Keep text whitespace verbatim instead of collapsing runs to one space
    pub preserve_whitespace: bool,
}

/// Renders an element as `{text, html}`, or `None` if the text is empty
pub fn format_element(element: ElementRef<'_>, options: FlattenOptions) -> Option<ExtractedContent> {
    let markdown = flatten_to_markdown(element, options);
    let text = markdown.trim();

    if text.is_empty() {
        return None;
    }

    Some(ExtractedContent {
        text: text.to_string(),
        html: element.html(),
    })
}

/// Converts an element and its descendants to markdown-like text
///
/// # Examples
///
/// ```
/// use page_trawler::probe::{flatten_to_markdown, FlattenOptions};
/// use scraper::{Html, Selector};
///
/// let html = Html::parse_fragment("<p>Hello <strong>world</strong></p>");
/// let p = html.select(&Selector::parse("p").unwrap()).next().unwrap();
/// assert_eq!(flatten_to_markdown(p, FlattenOptions::default()).trim(), "Hello **world**");
/// ```
pub fn flatten_to_markdown(element: ElementRef<'_>, options: FlattenOptions) -> String {
    let mut stack = match convert(element, options) {
        Step::Done(text) => return text,
        Step::Descend(frame) => vec![frame],
    };

    loop {
        let next = match stack.last_mut() {
            Some(top) => top.pieces.next(),
            None => return String::new(),
        };

        match next {
            Some(Piece::Text(text)) => {
                if let Some(top) = stack.last_mut() {
                    if top.accepts_text() {
                        push_text(&mut top.buf, text, options);
                    }
                }
            }
            Some(Piece::Element(child)) => {
                let step = match stack.last_mut() {
                    Some(top) => top.child_step(child, options),
                    None => return String::new(),
                };
                match step {
                    Some(Step::Done(text)) => {
                        if let Some(top) = stack.last_mut() {
                            append_output(&mut top.buf, &text);
                        }
                    }
                    Some(Step::Descend(frame)) => stack.push(frame),
                    None => {}
                }
            }
            None => {
                let Some(frame) = stack.pop() else {
                    return String::new();
                };
                let output = frame.finish(options);
                match stack.last_mut() {
                    Some(parent) => append_output(&mut parent.buf, &output),
                    None => return output,
                }
            }
        }
    }
}

/// A child node as seen by a frame
enum Piece<'a> {
    Text(&'a str),
    Element(ElementRef<'a>),
}

/// What to do with an element: emit text now, or walk its children
enum Step<'a> {
    Done(String),
    Descend(Frame<'a>),
}

enum FrameKind {
    Inline,
    Paragraph,
    Blockquote,
    List { ordered: bool, count: usize },
    ListItem { marker: String },
}

struct Frame<'a> {
    kind: FrameKind,
    pieces: std::vec::IntoIter<Piece<'a>>,
    buf: String,
}

impl<'a> Frame<'a> {
    fn new(element: ElementRef<'a>, kind: FrameKind) -> Self {
        let pieces: Vec<Piece<'a>> = element
            .children()
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some(Piece::Text(&**text)),
                Node::Element(_) => ElementRef::wrap(node).map(Piece::Element),
                _ => None,
            })
            .collect();

        Self {
            kind,
            pieces: pieces.into_iter(),
            buf: String::new(),
        }
    }

    /// Lists only keep their direct `li` children
    fn accepts_text(&self) -> bool {
        !matches!(self.kind, FrameKind::List { .. })
    }

    fn child_step(&mut self, child: ElementRef<'a>, options: FlattenOptions) -> Option<Step<'a>> {
        match &mut self.kind {
            FrameKind::List { ordered, count } => {
                if child.value().name() != "li" {
                    return None;
                }
                *count += 1;
                let marker = if *ordered {
                    format!("{}.", count)
                } else {
                    "-".to_string()
                };
                Some(Step::Descend(Frame::new(child, FrameKind::ListItem { marker })))
            }
            _ => Some(convert(child, options)),
        }
    }

    fn finish(self, options: FlattenOptions) -> String {
        match self.kind {
            FrameKind::List { .. } => {
                if self.buf.is_empty() {
                    String::new()
                } else {
                    format!("{}\n", self.buf)
                }
            }
            FrameKind::Inline => tidy(&self.buf, options),
            FrameKind::Paragraph => {
                let body = tidy(&self.buf, options);
                if body.is_empty() {
                    String::new()
                } else {
                    format!("{}\n\n", body)
                }
            }
            FrameKind::Blockquote => {
                let body = tidy(&self.buf, options);
                if body.is_empty() {
                    return String::new();
                }
                let quoted: Vec<String> = body
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect();
                format!("{}\n\n", quoted.join("\n"))
            }
            FrameKind::ListItem { marker } => {
                let body = tidy(&self.buf, options);
                let mut lines = body.lines().filter(|l| !l.trim().is_empty());
                let mut out = format!("{} {}\n", marker, lines.next().unwrap_or(""));
                for line in lines {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
                out
            }
        }
    }
}

/// Dispatches on tag name
fn convert<'a>(element: ElementRef<'a>, options: FlattenOptions) -> Step<'a> {
    let name = element.value().name();

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = text_content(element, options);
            if text.is_empty() {
                Step::Done(String::new())
            } else {
                Step::Done(format!("{} {}\n\n", "#".repeat(level), text))
            }
        }

        "p" => Step::Descend(Frame::new(element, FrameKind::Paragraph)),
        "blockquote" => Step::Descend(Frame::new(element, FrameKind::Blockquote)),
        "ul" => Step::Descend(Frame::new(
            element,
            FrameKind::List {
                ordered: false,
                count: 0,
            },
        )),
        "ol" => Step::Descend(Frame::new(
            element,
            FrameKind::List {
                ordered: true,
                count: 0,
            },
        )),

        "a" => {
            let text = text_content(element, options);
            match element.value().attr("href") {
                _ if text.is_empty() => Step::Done(String::new()),
                Some(href) => Step::Done(format!("[{}]({})", text, href)),
                None => Step::Done(text),
            }
        }

        "strong" | "b" => Step::Done(wrap_marker(&text_content(element, options), "**")),
        "em" | "i" => Step::Done(wrap_marker(&text_content(element, options), "*")),
        "code" => Step::Done(wrap_marker(&text_content(element, options), "`")),

        "pre" => {
            let code = Selector::parse("code")
                .ok()
                .and_then(|sel| element.select(&sel).next())
                .unwrap_or(element);
            let raw: String = code.text().collect();
            let content = raw.trim_start_matches('\n').trim_end();
            Step::Done(format!("```\n{}\n```\n\n", content))
        }

        "li" => Step::Done(text_content(element, options)),
        "br" => Step::Done("\n".to_string()),
        "hr" => Step::Done("---\n\n".to_string()),

        "img" => {
            let alt = element.value().attr("alt").unwrap_or("");
            match element.value().attr("src") {
                Some(src) => Step::Done(format!("![{}]({})", alt, src)),
                None => Step::Done(String::new()),
            }
        }

        "table" => Step::Done(format_table(element, options)),

        "script" | "style" | "noscript" | "template" | "head" => Step::Done(String::new()),

        _ => Step::Descend(Frame::new(element, FrameKind::Inline)),
    }
}

/// Block output (ending in a blank line) always starts on its own line
fn append_output(buf: &mut String, output: &str) {
    if output.ends_with("\n\n") && !buf.is_empty() && !buf.ends_with('\n') {
        buf.push('\n');
    }
    buf.push_str(output);
}

fn wrap_marker(text: &str, marker: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{}{}{}", marker, text, marker)
    }
}

fn format_table(table: ElementRef<'_>, options: FlattenOptions) -> String {
    let (Ok(row_sel), Ok(cell_sel)) = (Selector::parse("tr"), Selector::parse("th, td")) else {
        return String::new();
    };

    let rows: Vec<Vec<String>> = table
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| text_content(cell, options))
                .collect()
        })
        .collect();

    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let mut out = format!("| {} |\n", header.join(" | "));
    out.push('|');
    out.push_str(&vec!["---"; header.len()].join("|"));
    out.push_str("|\n");
    for row in body {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out.push('\n');
    out
}

/// Text content with whitespace runs collapsed (unless preserving)
fn text_content(element: ElementRef<'_>, options: FlattenOptions) -> String {
    let raw: String = element.text().collect();
    if options.preserve_whitespace {
        raw.trim().to_string()
    } else {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Appends a text node, collapsing whitespace at the seam with what came before
fn push_text(buf: &mut String, text: &str, options: FlattenOptions) {
    if options.preserve_whitespace {
        buf.push_str(text);
        return;
    }

    let at_boundary = buf.is_empty() || buf.ends_with(char::is_whitespace);
    let mut pending_space = false;
    let mut wrote_any = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && (wrote_any || !at_boundary) {
            buf.push(' ');
        }
        pending_space = false;
        wrote_any = true;
        buf.push(c);
    }

    if pending_space && (wrote_any || !at_boundary) {
        buf.push(' ');
    }
}

/// Trims lines, limits blank runs to one blank line, and trims the whole
fn tidy(buf: &str, options: FlattenOptions) -> String {
    if options.preserve_whitespace {
        return buf.trim().to_string();
    }

    let mut out = String::with_capacity(buf.len());
    let mut blank_run = 0;

    for line in buf.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }

    out.trim().to_string()
}
