//! Crawler module for fetching and walking the result listing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Element wrappers and link resolution for HTML callbacks
//! - Request scheduling and per-domain rate limiting
//! - The callback-driven collector
//! - The pagination controller and overall scrape coordination

mod collector;
mod controller;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use collector::{
    Collector, CollectorConfig, CollectorStats, CrawlHandler, VisitError, Visits,
};
pub use controller::{CrawlController, CrawlOutcome};
pub use coordinator::{run_scrape, Coordinator};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use parser::{is_html, resolve_link, HtmlElement};
pub use scheduler::{DelayRange, LimitRule, Request, Scheduler};

use crate::config::{Config, SearchOptions};
use crate::output::CrawlReport;
use crate::ScrapeError;

/// Runs a complete scrape
///
/// This is the main entry point for a run. It will:
/// 1. Build the URL of the first listing page
/// 2. Create the output file and write the CSV header
/// 3. Build the HTTP client
/// 4. Follow the "Next" chain up to the page cap
/// 5. Return the report
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `search` - Term, language, document type and pace of this run
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Scrape completed
/// * `Err(ScrapeError)` - Startup failed or the first page could not be fetched
pub async fn scrape(config: Config, search: SearchOptions) -> Result<CrawlReport, ScrapeError> {
    run_scrape(config, search).await
}
