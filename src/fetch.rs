//! Page fetching with bounded immediate retry
//!
//! A single attempt fails when the transport reports an error, when the
//! body comes back empty, or when the body starts with a configured
//! site-level error sentinel. The three causes are deliberately not
//! distinguished: the upstream servers intermittently serve error pages
//! even for valid offsets, so every failure consumes one retry slot and
//! the page is re-requested immediately, without backoff. After
//! `retry_bound` consecutive failures the page is reported exhausted and
//! the run moves on.

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of fetching one logical page.
///
/// Exhaustion does not record which cause produced the final failure —
/// only the outcome matters downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page body, non-empty and free of the error sentinel
    Success(String),
    /// All retry attempts failed
    Exhausted,
}

/// Transport abstraction over one HTTP GET
///
/// Exists so the retry loop and the drivers can be exercised against a
/// scripted transport in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issue one GET and return the response body as text.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// reqwest-backed transport used by the real pipelines
///
/// The client is connection-pooled; responses are fully consumed (or
/// dropped on error), which releases the underlying connection on every
/// exit path.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a transport with a crate-identifying user agent.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("game-scrape/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Bounded-retry wrapper around a [`Fetch`] transport
#[derive(Debug)]
pub struct PageFetcher<F> {
    transport: F,
    retry_bound: u32,
    error_sentinel: Option<&'static str>,
}

impl<F: Fetch> PageFetcher<F> {
    /// Wrap `transport` with a retry bound.
    pub fn new(transport: F, retry_bound: u32) -> Self {
        Self {
            transport,
            retry_bound,
            error_sentinel: None,
        }
    }

    /// Treat bodies starting with `sentinel` as failed attempts.
    ///
    /// The catalog site serves its "no results" page both for out-of-range
    /// offsets and, unpredictably, for requests that simply failed, so it
    /// is retried like any other failure.
    pub fn with_error_sentinel(mut self, sentinel: &'static str) -> Self {
        self.error_sentinel = Some(sentinel);
        self
    }

    /// Fetch one page, retrying failed attempts up to the bound.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        for attempt in 1..=self.retry_bound {
            match self.transport.get_text(url).await {
                Ok(body) => {
                    if body.is_empty() {
                        tracing::debug!(url = %url, attempt, "attempt returned empty body");
                    } else if self.error_sentinel.is_some_and(|s| body.starts_with(s)) {
                        tracing::debug!(url = %url, attempt, "site reported no results");
                    } else {
                        return FetchOutcome::Success(body);
                    }
                }
                Err(error) => {
                    tracing::debug!(url = %url, attempt, error = %error, "attempt failed");
                }
            }
        }
        tracing::warn!(
            url = %url,
            attempts = self.retry_bound,
            "failed to fetch page, giving up"
        );
        FetchOutcome::Exhausted
    }
}
