use url::Url;

/// Extracts the host from a URL, lowercased
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_trawler::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `candidate` has the same hostname as `page`
///
/// Only the hostname is compared: scheme and port may differ. URLs without a
/// host (`mailto:`, `javascript:`, `data:`) are never same-origin.
pub fn is_same_origin(page: &Url, candidate: &Url) -> bool {
    match (extract_host(page), extract_host(candidate)) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}
