//! HTTP fetching with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: Core trait for fetching one URL
//! - [`PageFetcher`]: Fetches HTML pages, rejecting non-HTML responses
//! - [`ImageFetcher`]: Fetches raw image bytes
//! - [`RetryFetch`]: Decorator that retries transient failures of any [`FetchAsync`]
//!
//! # Retry Strategy
//!
//! Only transient failures are retried (transport errors, `429`, `5xx`).
//! The delay before retry `n` is `min(base_delay * 2^(n-1), max_delay)` plus
//! up to `max_jitter` of random jitter.

use rand::{Rng, rng};
use reqwest::{Client, StatusCode, header};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Why a fetch failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} is not an HTML page (content type {content_type:?})")]
    NotHtml { url: String, content_type: String },
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::NotHtml { .. } => false,
        }
    }
}

/// Trait for fetching one URL.
pub trait FetchAsync {
    /// The decoded body type.
    type Response;

    async fn fetch(&self, url: &str) -> Result<Self::Response, FetchError>;
}

/// Build the shared HTTP client.
pub fn build_client(user_agent: &str, timeout: StdDuration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

async fn get_ok(client: &Client, url: &str) -> Result<reqwest::Response, FetchError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
    if resp.status() != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    Ok(resp)
}

/// Fetches HTML pages as text.
///
/// A response counts only when the status is `200` and the content type
/// mentions `html`.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    pub client: Client,
}

impl FetchAsync for PageFetcher {
    type Response = String;

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Self::Response, FetchError> {
        let resp = get_ok(&self.client, url).await?;
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !content_type.contains("html") {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }
        resp.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

/// Fetches raw bytes, used for chart images.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    pub client: Client,
}

impl FetchAsync for ImageFetcher {
    type Response = Vec<u8>;

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Self::Response, FetchError> {
        let resp = get_ok(&self.client, url).await?;
        let bytes = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(bytes = bytes.len(), "Fetched image");
        Ok(bytes.to_vec())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`] implementation.
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Retries allowed after the first attempt.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
    /// Upper bound of the random jitter added to each delay.
    max_jitter: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=jitter_ms)
        };
        delay + StdDuration::from_millis(jitter)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Self::Response, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() {
                        return Err(e);
                    }
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
