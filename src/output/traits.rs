//! Result sink trait and errors
//!
//! A sink receives the header once and then one record at a time. Each write
//! is flushed before the call returns so an interrupted run keeps every row
//! reported as written.

use crate::extract::Record;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot prepare output destination: {0}")]
    Destination(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for matched records
pub trait ResultSink {
    /// Writes the column header row
    ///
    /// # Arguments
    ///
    /// * `columns` - Column names, in record field order
    fn write_header(&mut self, columns: &[&str]) -> OutputResult<()>;

    /// Appends one record and flushes it
    ///
    /// The sink takes ownership of the record. On error the row is lost but
    /// the sink stays usable for the following records.
    fn write_record(&mut self, record: Record) -> OutputResult<()>;

    /// Number of records successfully written so far
    fn rows_written(&self) -> u64;
}
