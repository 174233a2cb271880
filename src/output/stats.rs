//! Statistics derived from a finished crawl
//!
//! This module provides functionality for summarizing a `CrawlReport` and
//! displaying the summary once the records have been written.

use crate::crawler::CrawlReport;
use crate::state::VisitOutcome;
use crate::url::PageRole;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of URLs that consumed visit budget
    pub visits: usize,

    /// Number of records produced
    pub records: usize,

    /// Records whose URL carries no query string
    pub main_records: usize,

    /// Visited pages by role
    pub pages_by_role: HashMap<PageRole, usize>,

    /// Visited pages by outcome
    pub pages_by_outcome: HashMap<VisitOutcome, usize>,

    /// Failure messages by URL
    pub failures: Vec<(String, String)>,

    /// URLs left in the frontier
    pub pending: usize,

    /// Item pages among the URLs left in the frontier
    pub pending_items: usize,

    pub duration_seconds: i64,

    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Builds statistics from a crawl report
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut pages_by_role = HashMap::new();
        let mut pages_by_outcome = HashMap::new();
        for page in &report.visited {
            *pages_by_role.entry(page.role).or_insert(0) += 1;
            *pages_by_outcome.entry(page.outcome).or_insert(0) += 1;
        }

        Self {
            visits: report.visits(),
            records: report.records.len(),
            main_records: report.records.iter().filter(|r| !r.has_query()).count(),
            pages_by_role,
            pages_by_outcome,
            failures: report
                .failures
                .iter()
                .map(|f| (f.url.clone(), f.message.clone()))
                .collect(),
            pending: report.pending,
            pending_items: report.pending_items,
            duration_seconds: report.duration().num_seconds(),
            cancelled: report.cancelled,
        }
    }

    /// Share of visited pages that were fetched and parsed, in percent
    pub fn success_rate(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        let succeeded: usize = self
            .pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_success())
            .map(|(_, count)| count)
            .sum();
        (succeeded as f64 / self.visits as f64) * 100.0
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Standard output is left to the console record sink.
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Pages visited: {}", stats.visits);
    eprintln!("  Records: {} ({} main)", stats.records, stats.main_records);
    eprintln!(
        "  Left in frontier: {} ({} item pages)",
        stats.pending, stats.pending_items
    );
    eprintln!("  Duration: {}s", stats.duration_seconds);
    if stats.cancelled {
        eprintln!("  Crawl was cancelled before it finished");
    }
    eprintln!();

    eprintln!("Pages by Role:");
    for role in [PageRole::Item, PageRole::Listing, PageRole::Other] {
        if let Some(count) = stats.pages_by_role.get(&role) {
            eprintln!("  {}: {}", role, count);
        }
    }
    eprintln!();

    if !stats.failures.is_empty() {
        eprintln!("Failures ({}):", stats.failures.len());
        for (url, message) in &stats.failures {
            eprintln!("  - {}: {}", url, message);
        }
        eprintln!();
    }

    eprintln!(
        "Success Rate: {:.1}% of {} visited pages fetched and parsed",
        stats.success_rate(),
        stats.visits
    );
}
