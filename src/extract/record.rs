//! Bibliographic record and the block-level extraction that builds it

use crate::config::SelectorConfig;
use crate::crawler::HtmlElement;
use crate::extract::fields::{
    extract_all_versions, extract_cited_by, extract_date, extract_doi, extract_journal,
};
use crate::ConfigError;
use scraper::Selector;
use serde::Serialize;

/// Column names of the CSV output, in field order
pub const CSV_HEADERS: [&str; 10] = [
    "Title",
    "Snippet",
    "Link",
    "Authors",
    "Date",
    "DOI",
    "Journal",
    "Cited by",
    "All versions",
    "Page",
];

/// One bibliographic entry of a result listing
///
/// Counts use `0` when the listing does not show them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Snippet")]
    pub snippet: String,
    #[serde(rename = "Link")]
    pub link: String,
    /// Raw attribution line ("authors - venue, year - host")
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "Journal")]
    pub journal: String,
    #[serde(rename = "Cited by")]
    pub cited_by: u64,
    #[serde(rename = "All versions")]
    pub all_versions: u64,
    /// 1-based listing page the record was found on
    #[serde(rename = "Page")]
    pub page: u32,
}

/// Compiled selectors for the listing layout
#[derive(Debug, Clone)]
pub struct Selectors {
    pub result_block: Selector,
    pub title: Selector,
    pub snippet: Selector,
    pub link: Selector,
    pub authors: Selector,
    pub actions: Selector,
    pub next_link: Selector,
}

impl Selectors {
    /// Compiles every selector of the configuration
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            result_block: compile(&config.result_block)?,
            title: compile(&config.title)?,
            snippet: compile(&config.snippet)?,
            link: compile(&config.link)?,
            authors: compile(&config.authors)?,
            actions: compile(&config.actions)?,
            next_link: compile(&config.next_link)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Builds a record from one result block
///
/// Returns `None` for malformed blocks that carry neither a title nor a
/// snippet. All other fields fall back to their sentinels.
pub fn extract_record(
    block: &HtmlElement<'_>,
    selectors: &Selectors,
    page: u32,
) -> Option<Record> {
    let title = block.child_text(&selectors.title);
    let snippet = block.child_text(&selectors.snippet);
    if title.is_empty() && snippet.is_empty() {
        return None;
    }

    let link = block.child_attr(&selectors.link, "href");
    let authors = block.child_text(&selectors.authors);
    let actions = block.child_texts(&selectors.actions).join(" ");

    Some(Record {
        date: extract_date(&authors),
        doi: extract_doi(&link),
        journal: extract_journal(&authors),
        cited_by: extract_cited_by(&actions),
        all_versions: extract_all_versions(&actions),
        title,
        snippet,
        link,
        authors,
        page,
    })
}
