//! Output module for persisting matched records
//!
//! This module handles:
//! - The result sink abstraction and its CSV implementation
//! - Naming and creating the output file next to the executable
//! - The end-of-run report

mod csv_sink;
mod report;
mod traits;

pub use csv_sink::CsvSink;
pub use report::{print_report, CrawlReport};
pub use traits::{OutputError, OutputResult, ResultSink};

use crate::config::OutputConfig;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Builds the file name for a run: `scrape-<term>-<YYYYMMDD-HHMMSS>.csv`
///
/// Characters of the term outside `[A-Za-z0-9_-]` are replaced with `_` so
/// the name is safe on every filesystem.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use scholar_scrape::output::output_file_name;
///
/// let stamp = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(
///     output_file_name("graphene oxide", stamp),
///     "scrape-graphene_oxide-20240309-140507.csv"
/// );
/// ```
pub fn output_file_name(term: &str, stamp: DateTime<Local>) -> String {
    let safe_term: String = term
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("scrape-{}-{}.csv", safe_term, stamp.format("%Y%m%d-%H%M%S"))
}

/// Resolves the configured output directory
///
/// A relative directory is anchored at the running executable's directory
/// when `relative_to_executable` is set, otherwise at the working directory.
pub fn resolve_output_dir(config: &OutputConfig) -> OutputResult<PathBuf> {
    let directory = Path::new(&config.directory);
    if directory.is_absolute() || !config.relative_to_executable {
        return Ok(directory.to_path_buf());
    }

    let exe = std::env::current_exe().map_err(|e| {
        OutputError::Destination(format!("cannot locate the running executable: {}", e))
    })?;
    let exe_dir = exe.parent().ok_or_else(|| {
        OutputError::Destination(format!("executable {} has no parent", exe.display()))
    })?;

    Ok(exe_dir.join(directory))
}

/// Creates the output directory (owner-only on Unix) if it does not exist
pub fn create_output_dir(dir: &Path) -> OutputResult<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir).map_err(|e| {
        OutputError::Destination(format!("cannot create {}: {}", dir.display(), e))
    })
}
