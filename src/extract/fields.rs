//! Field heuristics over the loosely structured text of a result block
//!
//! Every function here is total: input that does not look like what we expect
//! produces a sentinel (`"Unknown"`, `"N/A"` or `0`) rather than an error.

use regex::Regex;
use std::sync::OnceLock;

/// Returned when no date or journal can be found
pub const UNKNOWN: &str = "Unknown";

/// Returned when the link is not a DOI link
pub const NOT_AVAILABLE: &str = "N/A";

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(19|20)\d{2}").expect("year regex is valid"))
}

fn cited_by_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Cited by (\d+)").expect("cited-by regex is valid"))
}

fn all_versions_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"All (\d+) versions").expect("versions regex is valid"))
}

/// Extracts a publication year from the attribution line
///
/// # Rules
///
/// 1. The first `19xx`/`20xx` anywhere in the text
/// 2. Otherwise, if the text has `-` separated segments, the trailing segment
///    trimmed (or the year inside it)
/// 3. Otherwise `"Unknown"`
///
/// # Examples
///
/// ```
/// use scholar_scrape::extract::extract_date;
///
/// assert_eq!(extract_date("A Smith - Nature - 2019 - nature.com"), "2019");
/// assert_eq!(extract_date("A Smith - Nature - nature.com"), "nature.com");
/// assert_eq!(extract_date("A Smith"), "Unknown");
/// ```
pub fn extract_date(authors: &str) -> String {
    let year = year_regex();
    if let Some(found) = year.find(authors) {
        return found.as_str().to_string();
    }

    let parts: Vec<&str> = authors.split('-').collect();
    if parts.len() > 1 {
        let last = parts[parts.len() - 1].trim();
        if let Some(found) = year.find(last) {
            return found.as_str().to_string();
        }
        return last.to_string();
    }

    UNKNOWN.to_string()
}

/// Returns the link itself when it points at doi.org, otherwise `"N/A"`
pub fn extract_doi(link: &str) -> String {
    if link.contains("doi.org") {
        link.to_string()
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Returns the first `-` separated segment of the attribution line
///
/// On Scholar listings this is the author list; the column keeps the name the
/// output format has always used.
pub fn extract_journal(authors: &str) -> String {
    let mut parts = authors.split('-');
    match (parts.next(), parts.next()) {
        (Some(first), Some(_)) => first.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Parses the "Cited by N" count out of the action-link row, `0` if absent
pub fn extract_cited_by(actions: &str) -> u64 {
    if !actions.contains("Cited by") {
        return 0;
    }
    capture_count(cited_by_regex(), actions)
}

/// Parses the "All N versions" count out of the action-link row, `0` if absent
pub fn extract_all_versions(actions: &str) -> u64 {
    if !actions.contains("All") {
        return 0;
    }
    capture_count(all_versions_regex(), actions)
}

fn capture_count(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Case-insensitive filter: does `term` appear in the title or the snippet?
pub fn matches_term(title: &str, snippet: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    title.to_lowercase().contains(&term) || snippet.to_lowercase().contains(&term)
}
