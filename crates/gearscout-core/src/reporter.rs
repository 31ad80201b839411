use std::time::Duration;

use crate::scrape::StopReason;

/// Events emitted by the engine for monitoring/logging.
#[derive(Debug, Clone)]
pub enum ScrapeEvent<'a> {
    SearchStarted {
        query: &'a str,
        sites: usize,
    },
    PageFetched {
        url: &'a str,
        bytes: usize,
    },
    RetryScheduled {
        url: &'a str,
        status: u16,
        attempt: u32,
        backoff: Duration,
    },
    PageMissing {
        url: &'a str,
        status: u16,
    },
    UnexpectedStatus {
        url: &'a str,
        status: u16,
    },
    ContainerSkipped {
        site: &'a str,
        page: u32,
    },
    PriceUnparsed {
        site: &'a str,
        price_text: &'a str,
    },
    PageExtracted {
        site: &'a str,
        page: u32,
        listings: usize,
    },
    DuplicatePage {
        site: &'a str,
        page: u32,
        similarity: f64,
    },
    SiteStopped {
        site: &'a str,
        reason: StopReason,
        listings: usize,
    },
    SiteFailed {
        site: &'a str,
        error: &'a str,
    },
    SiteTimedOut {
        site: &'a str,
    },
    SearchFinished {
        query: &'a str,
        sites: usize,
        products: usize,
    },
}

impl ScrapeEvent<'_> {
    /// Short stable name of the event variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeEvent::SearchStarted { .. } => "search_started",
            ScrapeEvent::PageFetched { .. } => "page_fetched",
            ScrapeEvent::RetryScheduled { .. } => "retry_scheduled",
            ScrapeEvent::PageMissing { .. } => "page_missing",
            ScrapeEvent::UnexpectedStatus { .. } => "unexpected_status",
            ScrapeEvent::ContainerSkipped { .. } => "container_skipped",
            ScrapeEvent::PriceUnparsed { .. } => "price_unparsed",
            ScrapeEvent::PageExtracted { .. } => "page_extracted",
            ScrapeEvent::DuplicatePage { .. } => "duplicate_page",
            ScrapeEvent::SiteStopped { .. } => "site_stopped",
            ScrapeEvent::SiteFailed { .. } => "site_failed",
            ScrapeEvent::SiteTimedOut { .. } => "site_timed_out",
            ScrapeEvent::SearchFinished { .. } => "search_finished",
        }
    }

    /// The site an event belongs to, when it is site-scoped.
    pub fn site(&self) -> Option<&str> {
        match self {
            ScrapeEvent::ContainerSkipped { site, .. }
            | ScrapeEvent::PriceUnparsed { site, .. }
            | ScrapeEvent::PageExtracted { site, .. }
            | ScrapeEvent::DuplicatePage { site, .. }
            | ScrapeEvent::SiteStopped { site, .. }
            | ScrapeEvent::SiteFailed { site, .. }
            | ScrapeEvent::SiteTimedOut { site } => Some(site),
            _ => None,
        }
    }
}

/// Trait for receiving engine events (decoupled logging).
pub trait ScrapeReporter: Send + Sync {
    fn report(&self, event: ScrapeEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ScrapeReporter for NullReporter {}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ScrapeReporter for TracingReporter {
    fn report(&self, event: ScrapeEvent<'_>) {
        match event {
            ScrapeEvent::SearchStarted { query, sites } => {
                tracing::info!(%query, %sites, "Search started");
            }
            ScrapeEvent::PageFetched { url, bytes } => {
                tracing::debug!(%url, %bytes, "Page fetched");
            }
            ScrapeEvent::RetryScheduled {
                url,
                status,
                attempt,
                backoff,
            } => {
                tracing::warn!(
                    %url,
                    %status,
                    %attempt,
                    backoff_ms = %backoff.as_millis(),
                    "Transient status, retrying"
                );
            }
            ScrapeEvent::PageMissing { url, status } => {
                tracing::debug!(%url, %status, "Page not found, end of results");
            }
            ScrapeEvent::UnexpectedStatus { url, status } => {
                tracing::warn!(%url, %status, "Unexpected status, treating as end of results");
            }
            ScrapeEvent::ContainerSkipped { site, page } => {
                tracing::debug!(%site, %page, "Container is not a product, skipped");
            }
            ScrapeEvent::PriceUnparsed { site, price_text } => {
                tracing::info!(%site, %price_text, "Price has no digits, keeping raw text");
            }
            ScrapeEvent::PageExtracted {
                site,
                page,
                listings,
            } => {
                tracing::info!(%site, %page, %listings, "Page extracted");
            }
            ScrapeEvent::DuplicatePage {
                site,
                page,
                similarity,
            } => {
                tracing::info!(%site, %page, %similarity, "Page repeats the previous one");
            }
            ScrapeEvent::SiteStopped {
                site,
                reason,
                listings,
            } => {
                tracing::info!(
                    %site,
                    %reason,
                    last_page = reason.page(),
                    %listings,
                    "Site finished"
                );
            }
            ScrapeEvent::SiteFailed { site, error } => {
                tracing::warn!(%site, %error, "Site failed, omitted from report");
            }
            ScrapeEvent::SiteTimedOut { site } => {
                tracing::warn!(%site, "Site did not finish before the deadline, omitted");
            }
            ScrapeEvent::SearchFinished {
                query,
                sites,
                products,
            } => {
                tracing::info!(%query, %sites, %products, "Search finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_scoped_events_expose_site() {
        let event = ScrapeEvent::SiteTimedOut { site: "Ataka" };
        assert_eq!(event.site(), Some("Ataka"));
        assert_eq!(event.kind(), "site_timed_out");

        let event = ScrapeEvent::PageFetched {
            url: "https://example.com",
            bytes: 10,
        };
        assert_eq!(event.site(), None);
    }

    #[test]
    fn tracing_reporter_logs_stop_page() {
        let reason = StopReason::Exhausted { page: 5 };
        assert_eq!(reason.page(), 5);
        TracingReporter.report(ScrapeEvent::SiteStopped {
            site: "Ataka",
            reason,
            listings: 12,
        });
    }

    #[test]
    fn default_report_is_a_no_op() {
        NullReporter.report(ScrapeEvent::SearchStarted {
            query: "belt",
            sites: 2,
        });
    }
}
