//! End-of-run report

use std::path::PathBuf;
use std::time::Duration;

/// What a finished crawl produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Rows written to the sink
    pub total_matches: u64,

    /// Listing pages fetched and parsed
    pub pages_visited: u32,

    /// Pages whose fetch failed; a failed first page also ends the run
    pub failed_pages: u32,

    /// Matching records lost to sink write errors
    pub write_failures: u64,

    /// Result blocks without title and snippet
    pub discarded_blocks: u64,

    /// Where the rows went, if written to a file
    pub output_path: Option<PathBuf>,

    pub elapsed: Duration,
}

impl CrawlReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Average number of matches per visited page
    pub fn matches_per_page(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        self.total_matches as f64 / self.pages_visited as f64
    }
}

/// Prints the report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Scrape Summary ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", report.pages_visited);
    println!("  Total matches: {}", report.total_matches);
    println!("  Matches per page: {:.1}", report.matches_per_page());
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if report.failed_pages > 0 || report.write_failures > 0 || report.discarded_blocks > 0 {
        println!("Problems:");
        println!("  Failed pages: {}", report.failed_pages);
        println!("  Rows lost to write errors: {}", report.write_failures);
        println!("  Malformed result blocks: {}", report.discarded_blocks);
        println!();
    }

    if let Some(path) = &report.output_path {
        println!("Results saved to: {}", path.display());
    }
}
