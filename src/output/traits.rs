//! Output sink trait and errors
//!
//! A sink receives the complete record sequence once the crawl has finished.

use crate::output::Record;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the records collected by a crawl
pub trait RecordSink {
    /// Writes the full record sequence, returning how many records were written
    fn write_records(&mut self, records: &[Record]) -> OutputResult<usize>;
}
