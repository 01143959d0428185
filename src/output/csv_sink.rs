//! CSV implementation of the result sink

use crate::extract::Record;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes records as CSV rows, flushing after every row
///
/// Each row is encoded into its own buffer before it reaches the writer, so
/// a row whose write fails is dropped and never resurfaces with a later one.
pub struct CsvSink<W: Write> {
    writer: W,
    rows: u64,
}

impl CsvSink<File> {
    /// Creates (or truncates) the CSV file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps any writer; the header is written explicitly via `write_header`
    pub fn from_writer(writer: W) -> Self {
        Self { writer, rows: 0 }
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_line(&mut self, line: &[u8]) -> OutputResult<()> {
        self.writer.write_all(line)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Encodes one CSV line with standard quoting
fn encode_line<F>(encode: F) -> OutputResult<Vec<u8>>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
{
    let mut line = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    encode(&mut line)?;
    line.into_inner()
        .map_err(|e| OutputError::Write(e.to_string()))
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn write_header(&mut self, columns: &[&str]) -> OutputResult<()> {
        let line = encode_line(|w| w.write_record(columns))?;
        self.write_line(&line)
    }

    fn write_record(&mut self, record: Record) -> OutputResult<()> {
        let line = encode_line(|w| w.serialize(&record))?;
        self.write_line(&line)?;
        self.rows += 1;
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows
    }
}
