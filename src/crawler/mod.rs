//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing, link extraction and record extraction
//! - The prioritized frontier
//! - Overall crawl coordination

mod engine;
mod extractor;
mod fetcher;
mod frontier;

pub use engine::{CrawlEngine, CrawlReport};
pub use extractor::{ExtractError, Extraction, Extractor};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpTransport, Transport, TransportError};
pub use frontier::{Frontier, QueuedUrl};

use crate::config::Config;
use crate::CrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from the user-agent and fetch settings
/// 2. Seed the frontier with the configured seed URL
/// 3. Visit pages until the frontier empties, the budget is spent, or
///    `cancel` fires
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that stops the crawl early
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed (possibly early, if cancelled)
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(config: &Config, cancel: CancellationToken) -> Result<CrawlReport, CrawlError> {
    CrawlEngine::from_config(config, cancel)?.run().await
}
