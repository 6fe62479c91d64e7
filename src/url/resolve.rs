use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves an anchor `href` to an absolute URL
///
/// Resolution is attempted first without a base (absolute hrefs), then against
/// `base`. Values that are empty or contain interior whitespace are rejected as
/// malformed; the caller drops them.
///
/// # Examples
///
/// ```
/// use page_trawler::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://a.com/x").unwrap();
/// assert_eq!(resolve_href("/rel", &base).unwrap().as_str(), "https://a.com/rel");
/// assert!(resolve_href("not a url", &base).is_err());
/// ```
pub fn resolve_href(href: &str, base: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Malformed("empty href".to_string()));
    }

    if href.chars().any(char::is_whitespace) {
        return Err(UrlError::Malformed(format!(
            "href contains whitespace: {}",
            href
        )));
    }

    match Url::parse(href) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(href)
            .map_err(|e| UrlError::Parse(format!("{}: {}", href, e))),
        Err(e) => Err(UrlError::Parse(format!("{}: {}", href, e))),
    }
}
