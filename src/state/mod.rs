//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: page index, match counters and log dedup of one run
//! - `DomainState`: per-domain request accounting used by the collector's
//!   limit rules

mod crawl_state;
mod domain_state;

pub use crawl_state::{Advance, CrawlState};
pub use domain_state::DomainState;
