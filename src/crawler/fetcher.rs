//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the identifying user agent
//! - The `Transport` seam performing one GET
//! - Retrying failed attempts with a fixed, cancellable delay

use crate::config::{FetchConfig, StatusPolicy, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Failure of a single fetch attempt
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

/// Failure of a whole fetch, after retries
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: TransportError,
    },

    #[error("Fetch of {url} cancelled after {attempts} attempts")]
    Cancelled { url: String, attempts: u32 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Exhausted { url, .. } | Self::Cancelled { url, .. } => url,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }
}

/// Performs a single GET and returns the response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::UserAgentConfig;
/// use catalog_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Transport` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    status_policy: StatusPolicy,
}

impl HttpTransport {
    pub fn new(client: Client, status_policy: StatusPolicy) -> Self {
        Self {
            client,
            status_policy,
        }
    }

    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetch: &FetchConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, fetch.timeout())?;
        Ok(Self::new(client, fetch.status_policy))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let request_error = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() && self.status_policy == StatusPolicy::Retry {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        Ok(body.to_vec())
    }
}

/// Retrying fetcher
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Attempt succeeds | Return the body |
/// | Attempt fails, attempts left | Wait `retry_delay`, try again |
/// | Attempt fails, none left | `FetchError::Exhausted` with the last error |
/// | Token cancelled | `FetchError::Cancelled` |
///
/// `max_retries` is the total number of attempts, so the default of 5 makes
/// at most 5 requests per URL. No delay follows the final attempt.
pub struct Fetcher<T> {
    transport: T,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            transport,
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    pub fn from_config(transport: T, config: &FetchConfig) -> Self {
        Self::new(transport, config.max_retries, config.retry_delay())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches a URL, retrying transport failures
    pub async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        let mut attempts = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled {
                    url: url.to_string(),
                    attempts,
                });
            }

            attempts += 1;
            let error = match self.transport.get(url).await {
                Ok(body) => {
                    if attempts > 1 {
                        tracing::debug!("Fetched {} on attempt {}", url, attempts);
                    }
                    return Ok(body);
                }
                Err(e) => e,
            };

            tracing::warn!(
                "Error fetching {}: {}. Retry {}/{}",
                url,
                error,
                attempts,
                self.max_retries
            );

            if attempts >= self.max_retries {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts,
                    last: error,
                });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(FetchError::Cancelled {
                        url: url.to_string(),
                        attempts,
                    });
                }
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }
    }
}
