//! Page fetching with identity rotation and retry-on-transient-status.
//!
//! The transport ([`Fetcher`]) reports raw statuses; [`PageFetcher`] turns
//! them into the three outcomes the scraper cares about:
//!
//! ```text
//! 2xx            -> Some(body)
//! 404, 410       -> None            (no more pages)
//! 403, 429, 5xx  -> backoff, retry  (same URL)
//! anything else  -> None            (logged)
//! ```

use std::sync::Arc;

use crate::config::{IdentityPool, RetryConfig};
use crate::error::AppError;
use crate::reporter::{ScrapeEvent, ScrapeReporter};
use crate::traits::Fetcher;

/// How a response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// The page definitively does not exist.
    Terminal,
    /// Blocked, throttled, or a server-side hiccup; worth retrying.
    Transient,
    Unexpected,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            404 | 410 => StatusClass::Terminal,
            403 | 429 | 500..=599 => StatusClass::Transient,
            _ => StatusClass::Unexpected,
        }
    }
}

/// Fetches result pages through any [`Fetcher`] transport.
#[derive(Clone)]
pub struct PageFetcher<F> {
    inner: F,
    identities: IdentityPool,
    retry: RetryConfig,
    reporter: Arc<dyn ScrapeReporter>,
}

impl<F: Fetcher> PageFetcher<F> {
    pub fn new(
        inner: F,
        identities: IdentityPool,
        retry: RetryConfig,
        reporter: Arc<dyn ScrapeReporter>,
    ) -> Self {
        Self {
            inner,
            identities,
            retry,
            reporter,
        }
    }

    /// Fetch one page.
    ///
    /// Returns `Ok(None)` when there is nothing (more) to read at this URL.
    /// Transient statuses and retryable transport errors are retried after
    /// a randomized backoff; with no `max_retries` this only ends when the
    /// caller drops the future (search deadline).
    pub async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, AppError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let status = match self.inner.fetch(url, self.identities.pick()).await {
                Ok(response) => match StatusClass::of(response.status) {
                    StatusClass::Success => {
                        self.reporter.report(ScrapeEvent::PageFetched {
                            url,
                            bytes: response.body.len(),
                        });
                        if response.body.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some(response.body));
                    }
                    StatusClass::Terminal => {
                        self.reporter.report(ScrapeEvent::PageMissing {
                            url,
                            status: response.status,
                        });
                        return Ok(None);
                    }
                    StatusClass::Unexpected => {
                        self.reporter.report(ScrapeEvent::UnexpectedStatus {
                            url,
                            status: response.status,
                        });
                        return Ok(None);
                    }
                    StatusClass::Transient => response.status,
                },
                Err(e) if e.is_retryable() => {
                    tracing::debug!(%url, error = %e, "Transport error, will retry");
                    0
                }
                Err(e) => return Err(e),
            };

            if let Some(max_retries) = self.retry.max_retries {
                if attempt > max_retries {
                    return Err(AppError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
            }

            let backoff = self.retry.backoff.sample();
            self.reporter.report(ScrapeEvent::RetryScheduled {
                url,
                status,
                attempt,
                backoff,
            });
            tokio::time::sleep(backoff).await;
        }
    }
}
