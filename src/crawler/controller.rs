//! Pagination controller
//!
//! Binds the collector callbacks to the crawl state machine:
//! - every result block is turned into a record, filtered by the search term
//!   and handed to the sink
//! - a "Next" link on the head page of the chain advances it, unless the
//!   page cap is reached
//! - the initial page failing aborts the run; later failures are counted

use crate::crawler::collector::{Collector, CrawlHandler, Visits};
use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::parser::HtmlElement;
use crate::crawler::scheduler::Request;
use crate::extract::{extract_record, matches_term, Selectors};
use crate::output::{CrawlReport, ResultSink};
use crate::state::{Advance, CrawlState};
use crate::ScrapeError;
use scraper::Selector;
use std::time::Instant;
use url::Url;

const RESULT_BLOCK_HOOK: usize = 0;
const NEXT_LINK_HOOK: usize = 1;

/// Text a pagination link must contain to be followed
const NEXT_LINK_TEXT: &str = "Next";

/// Result of a finished run: the report and the sink, handed back for
/// flushing or inspection
#[derive(Debug)]
pub struct CrawlOutcome<S> {
    pub report: CrawlReport,
    pub sink: S,
}

/// Drives one paginated crawl and owns its state
pub struct CrawlController<S: ResultSink> {
    term: String,
    max_pages: u32,
    selectors: Selectors,
    sink: S,
    state: CrawlState,

    /// Failure of the initial request; it ends the run with an error
    fatal: Option<(String, FetchError)>,
}

impl<S: ResultSink> CrawlController<S> {
    /// Creates a controller
    ///
    /// # Arguments
    ///
    /// * `term` - Records must contain this (case-insensitively) in title or snippet
    /// * `max_pages` - Page cap; pages `0..max_pages` may be visited
    /// * `selectors` - Compiled listing selectors
    /// * `sink` - Destination for matching records, header already written
    pub fn new(term: impl Into<String>, max_pages: u32, selectors: Selectors, sink: S) -> Self {
        Self {
            term: term.into(),
            max_pages,
            selectors,
            sink,
            state: CrawlState::new(),
            fatal: None,
        }
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Crawls from `start_url` (page 0) until the chain ends or hits the cap
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Chain finished; later page failures are in the report
    /// * `Err(ScrapeError)` - The start URL was refused or its fetch failed
    pub async fn run<F: Fetcher + 'static>(
        mut self,
        collector: &Collector<F>,
        start_url: &Url,
    ) -> Result<CrawlOutcome<S>, ScrapeError> {
        let started = Instant::now();

        let stats = collector.run(start_url.as_str(), 0, &mut self).await?;

        if let Some((url, source)) = self.fatal.take() {
            return Err(ScrapeError::Fetch { url, source });
        }

        tracing::info!("Total results found: {}", self.state.total_matches());
        tracing::debug!(
            "Collector made {} requests, {} failed",
            stats.requests,
            stats.failures
        );

        let report = CrawlReport {
            total_matches: self.state.total_matches(),
            pages_visited: self.state.pages_visited(),
            failed_pages: self.state.failed_pages(),
            write_failures: self.state.write_failures(),
            discarded_blocks: self.state.discarded_blocks(),
            output_path: None,
            elapsed: started.elapsed(),
        };

        Ok(CrawlOutcome {
            report,
            sink: self.sink,
        })
    }

    fn handle_result_block(&mut self, block: &HtmlElement<'_>, page: u32) {
        let Some(record) = extract_record(block, &self.selectors, page + 1) else {
            tracing::debug!(
                "Skipping result block without title or snippet on page {}",
                page + 1
            );
            self.state.record_discarded();
            return;
        };

        if !matches_term(&record.title, &record.snippet, &self.term) {
            tracing::trace!("No match: {}", record.title);
            return;
        }

        match self.sink.write_record(record) {
            Ok(()) => self.state.record_match(),
            Err(e) => {
                tracing::warn!("Failed to write record from page {}: {}", page + 1, e);
                self.state.record_write_failure();
            }
        }
    }

    fn handle_next_link(
        &mut self,
        link: &HtmlElement<'_>,
        page: u32,
        visits: &mut Visits<'_, u32>,
    ) {
        if !link.text().contains(NEXT_LINK_TEXT) {
            return;
        }

        let Some(href) = link.attr("href") else {
            tracing::debug!("Next link on page {} has no href", page + 1);
            return;
        };

        let page_matches = self.state.page_matches();
        match self.state.try_advance(page, self.max_pages) {
            Advance::Advanced {
                from,
                to,
                log_scraped,
            } => {
                if log_scraped {
                    tracing::info!("Page {} scraped.", from + 1);
                    tracing::debug!(
                        "{} results on page {}, {} in total",
                        page_matches,
                        from + 1,
                        self.state.total_matches()
                    );
                }
                tracing::info!("Navigating to page {}...", to + 1);
                if let Err(e) = visits.visit(href, to) {
                    tracing::warn!("Cannot visit page {}: {}", to + 1, e);
                }
            }
            Advance::CapReached => {
                tracing::info!(
                    "Reached the limit of {} pages, not following the next link",
                    self.max_pages
                );
            }
            Advance::Stale => {
                tracing::debug!(
                    "Ignoring next link on page {}, chain already moved on",
                    page + 1
                );
            }
        }
    }
}

impl<S: ResultSink> CrawlHandler for CrawlController<S> {
    /// 0-based listing page index
    type Context = u32;

    fn selectors(&self) -> Vec<Selector> {
        vec![
            self.selectors.result_block.clone(),
            self.selectors.next_link.clone(),
        ]
    }

    fn on_html(
        &mut self,
        hook: usize,
        element: &HtmlElement<'_>,
        request: &Request<u32>,
        visits: &mut Visits<'_, u32>,
    ) {
        match hook {
            RESULT_BLOCK_HOOK => self.handle_result_block(element, request.ctx),
            NEXT_LINK_HOOK => self.handle_next_link(element, request.ctx, visits),
            _ => {}
        }
    }

    fn on_scraped(&mut self, request: &Request<u32>, _page: &FetchedPage) {
        let page = request.ctx;
        if self.state.mark_scraped(page) {
            tracing::info!(
                "Found {} results so far ({} on page {})",
                self.state.total_matches(),
                self.state.page_matches(),
                page + 1
            );
        }
    }

    fn on_error(&mut self, request: &Request<u32>, error: &FetchError) {
        tracing::error!("Request failed on URL: {}, Error: {}", request.url, error);
        self.state.mark_failed(request.ctx);

        if request.depth == 1 && self.fatal.is_none() {
            self.fatal = Some((request.url.to_string(), error.clone()));
        }
    }
}
