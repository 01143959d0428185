//! Configuration module for Scholar-Scrape
//!
//! Defaults cover the Google Scholar listing; an optional TOML file overrides
//! any section.
//!
//! # Example
//!
//! ```no_run
//! use scholar_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrape.toml")).unwrap();
//! println!("Will follow at most {} pages", config.scraper.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DocumentType, LimitConfig, OutputConfig, ScraperConfig, SearchOptions,
    SelectorConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_search};
