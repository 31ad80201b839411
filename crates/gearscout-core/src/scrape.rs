use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adapter::SiteAdapter;
use crate::dedup::DuplicatePageDetector;
use crate::error::AppError;
use crate::extract::ListingExtractor;
use crate::fetch::PageFetcher;
use crate::models::Listing;
use crate::normalize::QueryTerms;
use crate::parser::Document;
use crate::reporter::{ScrapeEvent, ScrapeReporter};
use crate::throttle::DelayRange;
use crate::traits::Fetcher;

/// Why a site's pagination loop ended. `page` is the page being handled
/// when the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The fetcher had nothing for this page (404, unexpected status, empty body).
    Exhausted { page: u32 },
    /// The page repeated the previous one.
    Duplicate { page: u32 },
    /// The page had no matching in-stock products.
    NoMatches { page: u32 },
    /// The search was cancelled (deadline) before the site finished.
    Cancelled { page: u32 },
}

impl StopReason {
    pub fn page(&self) -> u32 {
        match self {
            StopReason::Exhausted { page }
            | StopReason::Duplicate { page }
            | StopReason::NoMatches { page }
            | StopReason::Cancelled { page } => *page,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted { page } => write!(f, "no content at page {page}"),
            StopReason::Duplicate { page } => write!(f, "page {page} repeats page {}", page - 1),
            StopReason::NoMatches { page } => write!(f, "no matches on page {page}"),
            StopReason::Cancelled { page } => write!(f, "cancelled before page {page}"),
        }
    }
}

/// Everything one site produced for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScrape {
    /// Listings in discovery order (page order, then document order).
    pub listings: Vec<Listing>,
    pub stop: StopReason,
}

enum PageVerdict {
    Duplicate(f64),
    Listings(Vec<Listing>),
}

/// Walks one site's result pages: fetch → parse → duplicate check →
/// extract → decide, strictly one page at a time.
///
/// ```text
/// Requesting(1) -> Parsing -> DuplicateCheck -> Extracting -> Deciding
///      ^                                                        |
///      +------------------ delay, page + 1 <--------------------+
/// ```
pub struct SiteScraper<F> {
    adapter: SiteAdapter,
    fetcher: PageFetcher<F>,
    page_delay: DelayRange,
    reporter: Arc<dyn ScrapeReporter>,
    cancel: CancellationToken,
}

impl<F: Fetcher> SiteScraper<F> {
    pub fn new(
        adapter: SiteAdapter,
        fetcher: PageFetcher<F>,
        page_delay: DelayRange,
        reporter: Arc<dyn ScrapeReporter>,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            page_delay,
            reporter,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop at the next suspension point once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Scrape every result page for `query`.
    ///
    /// An empty listing set is a valid outcome ("no matches"). Errors mean
    /// the site as a whole failed (e.g. retries exhausted).
    pub async fn scrape(&self, query: &str) -> Result<SiteScrape, AppError> {
        let site = self.adapter.name();
        let terms = QueryTerms::new(query);
        let mut detector = DuplicatePageDetector::new();
        let mut listings = Vec::new();
        let mut page: u32 = 1;

        let stop = loop {
            let url = self.adapter.page_url(page, query);

            let body = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Cancelled { page },
                body = self.fetcher.fetch(&url) => body?,
            };
            let Some(body) = body else {
                break StopReason::Exhausted { page };
            };

            match self.process_page(&body, page, &terms, &mut detector) {
                PageVerdict::Duplicate(similarity) => {
                    self.reporter.report(ScrapeEvent::DuplicatePage {
                        site,
                        page,
                        similarity,
                    });
                    break StopReason::Duplicate { page };
                }
                PageVerdict::Listings(found) if found.is_empty() => {
                    break StopReason::NoMatches { page };
                }
                PageVerdict::Listings(found) => {
                    self.reporter.report(ScrapeEvent::PageExtracted {
                        site,
                        page,
                        listings: found.len(),
                    });
                    listings.extend(found);
                }
            }

            page += 1;
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Cancelled { page },
                _ = self.page_delay.wait() => {}
            }
        };

        self.reporter.report(ScrapeEvent::SiteStopped {
            site,
            reason: stop,
            listings: listings.len(),
        });

        Ok(SiteScrape { listings, stop })
    }

    /// Parse, check for a repeated page, then extract. Synchronous so the
    /// parsed document never lives across an await.
    fn process_page(
        &self,
        body: &[u8],
        page: u32,
        terms: &QueryTerms,
        detector: &mut DuplicatePageDetector,
    ) -> PageVerdict {
        let document = Document::parse(body);
        let fingerprint = document.container_texts(self.adapter.container_selector());
        if detector.is_duplicate(fingerprint) {
            return PageVerdict::Duplicate(detector.last_similarity());
        }

        let extractor = ListingExtractor::new(&self.adapter, terms, self.reporter.as_ref());
        PageVerdict::Listings(extractor.extract(&document, page))
    }
}
