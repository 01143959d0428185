use url::Url;

/// Returns the lowercase host of a URL, without the port
///
/// This is the key the collector uses for allow-listing and for per-domain
/// rate limiting. URLs without a host (`data:`, `file:`) give `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scholar_scrape::url::extract_domain;
///
/// let url = Url::parse("https://Scholar.Google.com/scholar?q=x").unwrap();
/// assert_eq!(extract_domain(&url), Some("scholar.google.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
