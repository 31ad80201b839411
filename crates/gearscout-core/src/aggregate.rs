use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::adapter::SiteAdapter;
use crate::config::ScoutConfig;
use crate::error::AppError;
use crate::fetch::PageFetcher;
use crate::models::{AggregateReport, SiteResult};
use crate::reporter::{ScrapeEvent, ScrapeReporter, TracingReporter};
use crate::scrape::{SiteScrape, SiteScraper, StopReason};
use crate::traits::Fetcher;

/// Runs one [`SiteScraper`] per adapter concurrently and merges the
/// outcomes into an [`AggregateReport`].
///
/// Sites are isolated from each other: a site that fails, finds nothing, or
/// misses the deadline is simply left out of the report.
pub struct AggregationEngine<F> {
    transport: F,
    config: ScoutConfig,
    reporter: Arc<dyn ScrapeReporter>,
}

impl<F: Fetcher> AggregationEngine<F> {
    /// Create an engine that reports through `tracing`.
    pub fn new(transport: F, config: ScoutConfig) -> Self {
        Self {
            transport,
            config,
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ScrapeReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Search `query` on every adapter and build the sorted report.
    ///
    /// Never fails: total failure is an empty report.
    pub async fn aggregate(&self, adapters: &[SiteAdapter], query: &str) -> AggregateReport {
        let span = tracing::info_span!("search", search_id = %Uuid::new_v4(), %query);
        self.run(adapters, query).instrument(span).await
    }

    async fn run(&self, adapters: &[SiteAdapter], query: &str) -> AggregateReport {
        self.reporter.report(ScrapeEvent::SearchStarted {
            query,
            sites: adapters.len(),
        });

        let cancel = CancellationToken::new();
        let fetcher = PageFetcher::new(
            self.transport.clone(),
            self.config.identities.clone(),
            self.config.retry.clone(),
            Arc::clone(&self.reporter),
        );

        let mut tasks = JoinSet::new();
        for (index, adapter) in adapters.iter().enumerate() {
            let scraper = SiteScraper::new(
                adapter.clone(),
                fetcher.clone(),
                self.config.page_delay,
                Arc::clone(&self.reporter),
            )
            .with_cancellation(cancel.child_token());
            let query = query.to_string();
            let span = tracing::info_span!("site", site = %adapter.name());
            tasks.spawn(
                async move { (index, scraper.scrape(&query).await) }.instrument(span),
            );
        }

        let mut finished = vec![false; adapters.len()];
        let mut completed: Vec<(usize, SiteScrape)> = Vec::new();
        let deadline = self
            .config
            .search_deadline
            .map(|limit| tokio::time::Instant::now() + limit);
        let mut timed_out = false;

        loop {
            let joined = match deadline {
                Some(at) => match tokio::time::timeout_at(at, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        // Unfinished scrapers notice the token at their next
                        // suspension point; nobody waits for them.
                        cancel.cancel();
                        tasks.detach_all();
                        timed_out = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, outcome)) => {
                    finished[index] = true;
                    self.collect(&adapters[index], index, outcome, &mut completed);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Site task panicked");
                }
            }
        }

        for (index, done) in finished.iter().enumerate() {
            if *done {
                continue;
            }
            let site = adapters[index].name();
            if timed_out {
                self.reporter.report(ScrapeEvent::SiteTimedOut { site });
            } else {
                self.reporter.report(ScrapeEvent::SiteFailed {
                    site,
                    error: "scraper task panicked",
                });
            }
        }

        // Input order before the stable price sort keeps ties deterministic.
        completed.sort_by_key(|(index, _)| *index);
        let sites = completed
            .into_iter()
            .filter_map(|(index, scrape)| {
                let adapter = &adapters[index];
                SiteResult::new(
                    adapter.name(),
                    adapter.search_url(query),
                    adapter.contacts().clone(),
                    scrape.listings,
                )
            })
            .collect();

        let report = AggregateReport::new(query, sites);
        self.reporter.report(ScrapeEvent::SearchFinished {
            query,
            sites: report.sites().len(),
            products: report.total_products(),
        });
        report
    }

    fn collect(
        &self,
        adapter: &SiteAdapter,
        index: usize,
        outcome: Result<SiteScrape, AppError>,
        completed: &mut Vec<(usize, SiteScrape)>,
    ) {
        match outcome {
            Ok(scrape) if matches!(scrape.stop, StopReason::Cancelled { .. }) => {
                self.reporter.report(ScrapeEvent::SiteTimedOut {
                    site: adapter.name(),
                });
            }
            Ok(scrape) => completed.push((index, scrape)),
            Err(e) => {
                let error = e.to_string();
                self.reporter.report(ScrapeEvent::SiteFailed {
                    site: adapter.name(),
                    error: &error,
                });
            }
        }
    }
}
