use url::Url;

/// Checks whether a URL passes a set of path filters
///
/// A URL passes when no filters are given, or when any filter is a
/// case-insensitive substring of either the full URL or its path. Filters are
/// expected to be lowercased already.
///
/// # Examples
///
/// ```
/// use page_trawler::url::matches_path_filter;
///
/// let filters = vec!["blog".to_string()];
/// assert!(matches_path_filter(&filters, "https://a.com/Blog/post1"));
/// assert!(!matches_path_filter(&filters, "https://a.com/shop/item"));
/// assert!(matches_path_filter(&[], "https://a.com/shop/item"));
/// ```
pub fn matches_path_filter(filters: &[String], candidate: &str) -> bool {
    if filters.is_empty() {
        return true;
    }

    let lower_url = candidate.to_lowercase();
    let lower_path = Url::parse(candidate)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default();

    filters
        .iter()
        .any(|filter| lower_url.contains(filter.as_str()) || lower_path.contains(filter.as_str()))
}
