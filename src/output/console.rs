//! Console report used by the minimal policy
//!
//! Every record is printed as one JSON line, followed by a summary of the
//! main records (those whose URL has no query string) with the first few
//! shown in a labeled block.

use crate::output::traits::{OutputResult, RecordSink};
use crate::output::Record;
use std::io::Write;

/// Number of main records shown in the labeled block
pub const SUMMARY_PREVIEW: usize = 5;

/// Width of the separator line printed after each labeled record
const SEPARATOR_WIDTH: usize = 50;

/// Prints records and their summary to any writer (standard output by default)
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for ConsoleSink<W> {
    fn write_records(&mut self, records: &[Record]) -> OutputResult<usize> {
        for record in records {
            writeln!(self.out, "{}", serde_json::to_string(record)?)?;
        }

        let main: Vec<&Record> = records.iter().filter(|r| !r.has_query()).collect();
        writeln!(self.out, "Total main records scraped: {}", main.len())?;
        writeln!(self.out)?;

        for record in main.iter().take(SUMMARY_PREVIEW) {
            for (label, value) in record.labeled_fields() {
                writeln!(self.out, "{}: {}", label, value)?;
            }
            writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        }

        self.out.flush()?;
        Ok(records.len())
    }
}
