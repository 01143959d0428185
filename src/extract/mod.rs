//! Record extraction for result listings
//!
//! This module turns one result block into a [`Record`]:
//! - `fields`: pure, total heuristics over the block's text (date, DOI,
//!   journal, citation and version counts) plus the term filter
//! - `record`: the record type, the compiled selectors and the block-level
//!   extraction

mod fields;
mod record;

pub use fields::{
    extract_all_versions, extract_cited_by, extract_date, extract_doi, extract_journal,
    matches_term, NOT_AVAILABLE, UNKNOWN,
};
pub use record::{extract_record, Record, Selectors, CSV_HEADERS};
