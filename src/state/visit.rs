/// Visit state definitions for tracking crawl progress
use crate::url::PageRole;
use std::fmt;

/// State of the crawl loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// URLs are still being dequeued
    #[default]
    Running,
    /// Frontier exhausted, budget spent, or crawl cancelled
    Finished,
}

impl EngineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Result of visiting a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitOutcome {
    /// Page fetched and a record was produced
    Recorded,

    /// Page fetched and parsed, but it yielded no record
    /// (minimal policy: not an item page, or a required field was missing)
    NoRecord,

    /// Fetch or parse failed; the URL contributed no record and no links
    Failed,
}

impl VisitOutcome {
    /// Returns true if the page was fetched and parsed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recorded | Self::NoRecord)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::NoRecord => "no_record",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A URL the engine dequeued and spent budget on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedPage {
    /// 1-based position in visit order
    pub index: usize,
    pub url: String,
    pub role: PageRole,
    pub outcome: VisitOutcome,
}

/// Error information for a URL that failed under the extended policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitFailure {
    /// The URL that failed
    pub url: String,

    /// Fetch attempts made before giving up (0 if the fetch succeeded)
    pub attempts: u32,

    /// Error message
    pub message: String,
}
