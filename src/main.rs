//! Scholar-Scrape main entry point
//!
//! This is the command-line interface for the Scholar-Scrape listing scraper.

use clap::Parser;
use scholar_scrape::config::{
    load_config_with_hash, validate, Config, DocumentType, SearchOptions,
};
use scholar_scrape::crawler::{scrape, Coordinator};
use scholar_scrape::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scholar-Scrape: a polite search-result scraper
///
/// Scholar-Scrape follows the "Next" links of a Google Scholar listing,
/// keeps the results whose title or snippet contains the search term and
/// appends them to a timestamped CSV file as they are found.
#[derive(Parser, Debug)]
#[command(name = "scholar-scrape")]
#[command(version)]
#[command(about = "A polite search-result scraper", long_about = None)]
struct Cli {
    /// Search term; also filters the results (case-insensitive)
    #[arg(short = 'q', long, value_name = "TERM")]
    query: String,

    /// Interface language code
    #[arg(long, default_value = "en")]
    lang: String,

    /// Document type filter: 0,5 all, 0,33 articles, 1,5 case law, 0 no patents, 2 patents only
    #[arg(long, value_name = "SDT", default_value = "0,5")]
    sdt: DocumentType,

    /// Wait 6-15 seconds between requests instead of 1-5
    #[arg(long)]
    slow: bool,

    /// Maximum number of listing pages to follow
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Directory for the CSV file (relative to the working directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be scraped without sending requests
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let search = SearchOptions {
        term: cli.query.trim().to_string(),
        lang: cli.lang.clone(),
        document_type: cli.sdt,
        slow: cli.slow,
    };

    if cli.dry_run {
        handle_dry_run(config, search)?;
    } else {
        handle_scrape(config, search).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scholar_scrape=info,warn"),
            1 => EnvFilter::new("scholar_scrape=debug,info"),
            2 => EnvFilter::new("scholar_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (or the defaults) and applies CLI overrides
fn load_settings(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(max_pages) = cli.max_pages {
        config.scraper.max_pages = max_pages;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
        config.output.relative_to_executable = false;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: validates settings and shows what would be scraped
fn handle_dry_run(
    config: Config,
    search: SearchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Scholar-Scrape Dry Run ===\n");

    println!("Search:");
    println!("  Term: {}", search.term);
    println!("  Language: {}", search.lang);
    println!("  Document type: {}", search.document_type);
    println!("  Pace: {}", if search.slow { "slow" } else { "normal" });

    println!("\nScraper:");
    println!("  Max pages: {}", config.scraper.max_pages);
    println!("  Max depth: {}", config.scraper.max_depth);
    println!("  Allowed domains: {}", config.scraper.allowed_domains.join(", "));
    let (min, max) = config.limits.delay_range(search.slow);
    println!(
        "  Delay between requests: {}-{}ms",
        min.as_millis(),
        max.as_millis()
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    let coordinator = Coordinator::new(config, search)?;

    println!("\nOutput:");
    println!("  File: {}", coordinator.output_path()?.display());

    println!("\n✓ Configuration is valid");
    println!("✓ Would start at {}", coordinator.start_url());

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: Config,
    search: SearchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Searching for \"{}\" (lang {}, document type {}, up to {} pages)",
        search.term,
        search.lang,
        search.document_type,
        config.scraper.max_pages
    );

    match scrape(config, search).await {
        Ok(report) => {
            tracing::info!("Scrape completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
