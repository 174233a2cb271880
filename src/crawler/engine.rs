//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Taking the next URL from the frontier and spending visit budget
//! - Fetching and extracting the page
//! - Feeding discovered links back into the frontier
//! - Collecting records and per-URL failures
//!
//! With one worker the loop is strictly sequential. With more, workers share
//! the frontier, visited set and budget behind one lock, and each applies its
//! own politeness delay.

use crate::config::{Config, PolicyVariant};
use crate::crawler::extractor::{Extraction, Extractor};
use crate::crawler::fetcher::{FetchError, Fetcher, HttpTransport, Transport};
use crate::crawler::frontier::{Frontier, QueuedUrl};
use crate::output::Record;
use crate::state::{EngineState, VisitFailure, VisitOutcome, VisitedPage};
use crate::url::{normalize_url, PageRole, SiteScope};
use crate::{CrawlError, UrlError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Records in the order they were produced
    pub records: Vec<Record>,

    /// Every URL that consumed visit budget, in visit order
    pub visited: Vec<VisitedPage>,

    /// URLs that failed under the extended policy
    pub failures: Vec<VisitFailure>,

    /// URLs still waiting in the frontier when the crawl stopped
    pub pending: usize,

    /// How many of the pending URLs are item pages
    pub pending_items: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// True if the crawl stopped because its token was cancelled
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn visits(&self) -> usize {
        self.visited.len()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Mutable crawl state, guarded by a single lock
#[derive(Debug, Default)]
struct CrawlState {
    frontier: Frontier,
    engine: EngineState,
    visits: usize,
    in_flight: usize,
    records: Vec<Record>,
    visited: Vec<VisitedPage>,
    failures: Vec<VisitFailure>,
}

/// What a worker should do next
enum Claim {
    Visit { queued: QueuedUrl, index: usize },
    Wait,
    Finished,
}

impl CrawlState {
    /// Takes the next unvisited URL and spends one unit of budget on it
    ///
    /// Already-visited URLs are skipped without consuming budget.
    /// Once the engine is `Finished` no further URL is handed out.
    fn claim(&mut self, scope: &SiteScope, max_visits: usize) -> Claim {
        loop {
            if self.engine.is_terminal() {
                return Claim::Finished;
            }

            if self.visits >= max_visits {
                self.finish("visit budget spent");
                return Claim::Finished;
            }

            let Some(queued) = self.frontier.next() else {
                if self.in_flight == 0 {
                    self.finish("frontier exhausted");
                    return Claim::Finished;
                }
                return Claim::Wait;
            };

            if !scope.contains(&queued.url) {
                tracing::warn!(
                    "Refusing {}: outside site scope {}",
                    queued.url,
                    scope.prefix()
                );
                continue;
            }

            if !self.frontier.mark_visited(&queued.url) {
                tracing::trace!("Skipping already visited {}", queued.url);
                continue;
            }

            self.visits += 1;
            self.in_flight += 1;
            return Claim::Visit {
                queued,
                index: self.visits,
            };
        }
    }

    /// Moves the engine to `Finished`; later calls keep the first reason
    fn finish(&mut self, reason: &str) {
        if !self.engine.is_terminal() {
            tracing::debug!("Crawl finished: {}", reason);
            self.engine = EngineState::Finished;
        }
    }
}

/// State shared by all workers
struct Shared<T> {
    fetcher: Fetcher<T>,
    extractor: Extractor,
    policy: PolicyVariant,
    max_visits: usize,
    politeness_delay: Duration,
    state: Mutex<CrawlState>,
    progress: Notify,
    cancel: CancellationToken,
}

/// Crawl engine owning its fetcher, extractor, frontier and budget
pub struct CrawlEngine<T = HttpTransport> {
    shared: Arc<Shared<T>>,
    workers: usize,
    external_cancel: CancellationToken,
}

impl CrawlEngine<HttpTransport> {
    /// Creates an engine that fetches over HTTP
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, CrawlError> {
        let transport = HttpTransport::from_config(&config.user_agent, &config.fetch)?;
        Self::new(config, transport, cancel)
    }
}

impl<T: Transport + 'static> CrawlEngine<T> {
    /// Creates an engine with an explicit transport
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `transport` - Performs the individual GET requests
    /// * `cancel` - Cancelling this token stops the crawl at the next check
    pub fn new(config: &Config, transport: T, cancel: CancellationToken) -> Result<Self, CrawlError> {
        let seed = normalize_url(&config.crawler.seed_url)?;
        let scope = SiteScope::new(
            &config.crawler.site_scope,
            seed.as_str(),
            &config.crawler.item_pattern,
            config.crawler.listing_pattern.as_deref(),
        )?;

        let policy = config.crawler.policy;
        let extractor = Extractor::new(scope.clone(), seed.clone(), policy, &config.extract)?;
        let fetcher = Fetcher::from_config(transport, &config.fetch);

        let mut frontier = Frontier::new();
        frontier.offer(seed.as_str(), scope.classify(seed.as_str()));

        let shared = Shared {
            fetcher,
            extractor,
            policy,
            max_visits: config.crawler.max_visits as usize,
            politeness_delay: config.crawler.politeness_delay(),
            state: Mutex::new(CrawlState {
                frontier,
                ..CrawlState::default()
            }),
            progress: Notify::new(),
            cancel: cancel.child_token(),
        };

        Ok(Self {
            shared: Arc::new(shared),
            workers: config.crawler.workers.max(1) as usize,
            external_cancel: cancel,
        })
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Frontier exhausted, budget spent, or cancelled
    /// * `Err(CrawlError)` - Minimal policy only: a fetch or parse failure
    ///   stopped the crawl
    pub async fn run(self) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl: policy {:?}, max {} visits, {} worker(s)",
            self.shared.policy,
            self.shared.max_visits,
            self.workers
        );

        let outcome = if self.workers == 1 {
            worker_loop(Arc::clone(&self.shared), 0).await
        } else {
            let mut workers = JoinSet::new();
            for id in 0..self.workers {
                workers.spawn(worker_loop(Arc::clone(&self.shared), id));
            }

            let mut first_error = None;
            while let Some(joined) = workers.join_next().await {
                let result = joined
                    .map_err(|e| CrawlError::Worker(e.to_string()))
                    .and_then(|r| r);
                if let Err(e) = result {
                    self.shared.cancel.cancel();
                    first_error.get_or_insert(e);
                }
            }
            first_error.map_or(Ok(()), Err)
        };

        if let Err(e) = outcome {
            tracing::error!("Crawl aborted: {}", e);
            return Err(e);
        }

        let state = std::mem::take(&mut *self.shared.state.lock().await);
        let report = CrawlReport {
            pending: state.frontier.len(),
            pending_items: state.frontier.pending_items(),
            records: state.records,
            visited: state.visited,
            failures: state.failures,
            started_at,
            finished_at: Utc::now(),
            cancelled: self.external_cancel.is_cancelled(),
        };

        tracing::info!(
            "Crawl finished: {} pages visited, {} records, {} failures in {}s",
            report.visits(),
            report.records.len(),
            report.failures.len(),
            report.duration().num_seconds()
        );

        Ok(report)
    }
}

/// One worker: claim, visit, pause, repeat
async fn worker_loop<T: Transport>(shared: Arc<Shared<T>>, worker: usize) -> Result<(), CrawlError> {
    loop {
        let (claim, notified) = {
            let mut state = shared.state.lock().await;
            if shared.cancel.is_cancelled() {
                state.finish("cancelled");
            }
            let claim = state.claim(shared.extractor.scope(), shared.max_visits);
            // Registered before the lock is released so no wakeup is missed
            (claim, shared.progress.notified())
        };

        match claim {
            Claim::Visit { queued, index } => {
                shared.visit(&queued, index).await?;

                if !shared.politeness_delay.is_zero() {
                    tokio::select! {
                        _ = shared.cancel.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(shared.politeness_delay) => {}
                    }
                }
            }
            Claim::Wait => {
                tokio::select! {
                    _ = shared.cancel.cancelled() => return Ok(()),
                    _ = notified => {}
                }
            }
            Claim::Finished => {
                tracing::debug!("Worker {} stopping", worker);
                return Ok(());
            }
        }
    }
}

impl<T: Transport> Shared<T> {
    /// Visits one claimed URL and folds the result back into the crawl state
    async fn visit(&self, queued: &QueuedUrl, index: usize) -> Result<(), CrawlError> {
        tracing::info!("Crawling ({}/{}): {}", index, self.max_visits, queued.url);

        let result = self.fetch_and_extract(&queued.url).await;

        let mut state = self.state.lock().await;
        state.in_flight -= 1;

        let visited = |outcome| VisitedPage {
            index,
            url: queued.url.clone(),
            role: queued.role,
            outcome,
        };

        let outcome = match result {
            Ok(extraction) => {
                let found = extraction.links.len();
                let mut added = 0;
                for link in &extraction.links {
                    let role = self.extractor.scope().classify(link);
                    if role == PageRole::Other && !self.policy.follows_other_pages() {
                        continue;
                    }
                    if state.frontier.offer(link, role) {
                        added += 1;
                    }
                }
                tracing::debug!(
                    "{}: {} links found, {} new, {} in frontier",
                    queued.url,
                    found,
                    added,
                    state.frontier.len()
                );

                let outcome = match extraction.record {
                    Some(record) => {
                        state.records.push(record);
                        VisitOutcome::Recorded
                    }
                    None => VisitOutcome::NoRecord,
                };
                state.visited.push(visited(outcome));
                Ok(())
            }
            Err(CrawlError::Fetch(FetchError::Cancelled { url, .. })) => {
                tracing::debug!("Fetch of {} cancelled", url);
                state.visited.push(visited(VisitOutcome::Failed));
                Ok(())
            }
            Err(error) if !self.policy.failures_are_fatal() => {
                let attempts = match &error {
                    CrawlError::Fetch(fetch) => fetch.attempts(),
                    _ => 0,
                };
                tracing::warn!(
                    "Skipping {} after {} attempt(s): {}",
                    queued.url,
                    attempts,
                    error
                );
                state.failures.push(VisitFailure {
                    url: queued.url.clone(),
                    attempts,
                    message: error.to_string(),
                });
                state.visited.push(visited(VisitOutcome::Failed));
                Ok(())
            }
            Err(error) => {
                state.visited.push(visited(VisitOutcome::Failed));
                state.finish("fatal error");
                self.cancel.cancel();
                Err(error)
            }
        };

        drop(state);
        self.progress.notify_waiters();

        outcome
    }

    async fn fetch_and_extract(&self, url: &str) -> Result<Extraction, CrawlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let body = self.fetcher.fetch(&parsed, &self.cancel).await?;
        Ok(self.extractor.extract_body(url, &body)?)
    }
}
