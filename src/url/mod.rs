//! URL handling module for Scholar-Scrape
//!
//! This module provides domain extraction, wildcard/glob matching for the
//! collector's allow-list and limit rules, and the search URL builder.

mod domain;
mod matcher;

use crate::config::SearchOptions;
use crate::{UrlError, UrlResult};
use url::form_urlencoded;
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::{matches_glob, matches_wildcard};

/// Number of results the listing shows per page
pub const RESULTS_PER_PAGE: u32 = 10;

/// Builds the listing URL for a search
///
/// The query string has the shape
/// `start=<page*10>&q=<term>&hl=<lang>&as_sdt=<sdt>`; only the term is
/// form-encoded, the language and document type codes are sent as given.
///
/// # Arguments
///
/// * `base_url` - The listing endpoint, e.g. `https://scholar.google.com/scholar`
/// * `search` - Term, language and document type of the run
/// * `page` - 0-based page index
///
/// # Examples
///
/// ```
/// use scholar_scrape::config::SearchOptions;
/// use scholar_scrape::url::build_search_url;
///
/// let url = build_search_url(
///     "https://scholar.google.com/scholar",
///     &SearchOptions::new("graphene oxide"),
///     1,
/// )
/// .unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://scholar.google.com/scholar?start=10&q=graphene+oxide&hl=en&as_sdt=0,5"
/// );
/// ```
pub fn build_search_url(base_url: &str, search: &SearchOptions, page: u32) -> UrlResult<Url> {
    let mut url = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    let term: String = form_urlencoded::byte_serialize(search.term.as_bytes()).collect();
    let lang: String = form_urlencoded::byte_serialize(search.lang.as_bytes()).collect();
    let query = format!(
        "start={}&q={}&hl={}&as_sdt={}",
        page * RESULTS_PER_PAGE,
        term,
        lang,
        search.document_type.code()
    );
    url.set_query(Some(&query));

    Ok(url)
}
