//! Output module for crawl records and reports
//!
//! This module handles:
//! - The record shapes produced by each policy
//! - Writing records as JSON lines or to the console
//! - Recording crawl statistics

mod console;
mod jsonl;
mod record;
pub mod stats;
mod traits;

pub use console::{ConsoleSink, SUMMARY_PREVIEW};
pub use jsonl::{read_records, JsonLinesSink};
pub use record::{ItemRecord, PageRecord, Record};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::{Config, OutputFormat};

/// Creates the sink matching the configured policy
///
/// The minimal policy reports to the console; the extended policy writes
/// the configured JSON-lines file.
pub fn sink_for(config: &Config) -> Box<dyn RecordSink> {
    match config.crawler.policy.output_format() {
        OutputFormat::Console => Box::new(ConsoleSink::stdout()),
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(&config.output.path)),
    }
}
