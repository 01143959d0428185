//! Scrape coordinator - main orchestration logic
//!
//! The coordinator is responsible for:
//! - Building the start URL from the search options
//! - Preparing the output directory and CSV file
//! - Configuring the collector (allowed domains, depth, rate limit rule)
//! - Running the pagination controller and completing the report

use crate::config::{Config, SearchOptions};
use crate::crawler::collector::{Collector, CollectorConfig};
use crate::crawler::controller::CrawlController;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::scheduler::LimitRule;
use crate::extract::{Selectors, CSV_HEADERS};
use crate::output::{
    create_output_dir, output_file_name, resolve_output_dir, CrawlReport, CsvSink, ResultSink,
};
use crate::url::build_search_url;
use crate::ScrapeError;
use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// Main scrape coordinator
pub struct Coordinator {
    config: Config,
    search: SearchOptions,
    selectors: Selectors,
    start_url: Url,
}

impl Coordinator {
    /// Creates a coordinator after validating the search options
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScrapeError::Startup)` - Missing term or unusable base URL
    pub fn new(config: Config, search: SearchOptions) -> Result<Self, ScrapeError> {
        crate::config::validate_search(&search)
            .map_err(|e| ScrapeError::Startup(e.to_string()))?;

        let selectors = Selectors::from_config(&config.selectors)?;
        let start_url = build_search_url(&config.scraper.base_url, &search, 0)
            .map_err(|e| ScrapeError::Startup(format!("cannot build search URL: {}", e)))?;

        Ok(Self {
            config,
            search,
            selectors,
            start_url,
        })
    }

    /// URL of the first listing page
    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn search(&self) -> &SearchOptions {
        &self.search
    }

    /// Collector settings derived from the configuration
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            allowed_domains: self.config.scraper.allowed_domains.clone(),
            max_depth: self.config.scraper.max_depth,
            limit_rules: vec![LimitRule::from_config(&self.config.limits, self.search.slow)],
        }
    }

    /// Path of the CSV file a run started now would write
    pub fn output_path(&self) -> Result<PathBuf, ScrapeError> {
        let dir = resolve_output_dir(&self.config.output)?;
        Ok(dir.join(output_file_name(&self.search.term, Local::now())))
    }

    /// Runs the scrape over HTTP
    pub async fn run(&self) -> Result<CrawlReport, ScrapeError> {
        let fetcher = HttpFetcher::new(&self.config.user_agent)?;
        self.run_with(fetcher).await
    }

    /// Runs the scrape with the given fetcher
    ///
    /// The output file is created and its header written before the first
    /// request; failing to do so aborts the run.
    pub async fn run_with<F: Fetcher + 'static>(
        &self,
        fetcher: F,
    ) -> Result<CrawlReport, ScrapeError> {
        let output_path = self.output_path()?;
        let sink = open_sink(&output_path)?;
        tracing::info!("Writing results to {}", output_path.display());

        tracing::info!("Scraping URL: {}", self.start_url);

        let collector = Collector::new(fetcher, self.collector_config());
        let controller = CrawlController::new(
            self.search.term.clone(),
            self.config.scraper.max_pages,
            self.selectors.clone(),
            sink,
        );

        let outcome = controller.run(&collector, &self.start_url).await?;
        outcome.sink.into_inner()?;

        let mut report = outcome.report;
        report.output_path = Some(output_path.clone());

        tracing::info!(
            "Scrape complete: {} results from {} pages, saved to {}",
            report.total_matches,
            report.pages_visited,
            output_path.display()
        );
        if report.failed_pages > 0 {
            tracing::warn!("{} pages failed to load", report.failed_pages);
        }

        Ok(report)
    }
}

/// Creates the output directory and file and writes the CSV header
fn open_sink(path: &Path) -> Result<CsvSink<File>, ScrapeError> {
    if let Some(dir) = path.parent() {
        create_output_dir(dir)?;
    }

    let mut sink = CsvSink::create(path)?;
    sink.write_header(&CSV_HEADERS)?;
    Ok(sink)
}

/// Runs a complete scrape
///
/// # Example
///
/// ```no_run
/// use scholar_scrape::config::{Config, SearchOptions};
/// use scholar_scrape::crawler::run_scrape;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_scrape(Config::default(), SearchOptions::new("graphene")).await?;
/// println!("{} matching results", report.total_matches);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(
    config: Config,
    search: SearchOptions,
) -> Result<CrawlReport, ScrapeError> {
    let coordinator = Coordinator::new(config, search)?;
    coordinator.run().await
}
