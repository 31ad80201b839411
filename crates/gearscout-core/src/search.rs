use std::time::Duration;

use tokio::time::Instant;

use crate::adapter::SiteAdapter;
use crate::aggregate::AggregationEngine;
use crate::error::AppError;
use crate::export;
use crate::models::AggregateReport;
use crate::normalize::normalize_phrase;
use crate::report::ReportFormatter;
use crate::traits::Fetcher;

/// Inbound entry point: a phrase typed by a user in, a finished report out.
pub struct SearchService<F> {
    engine: AggregationEngine<F>,
    adapters: Vec<SiteAdapter>,
}

/// A completed search with at least one matching listing.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub report: AggregateReport,
    pub elapsed: Duration,
}

impl<F: Fetcher> SearchService<F> {
    pub fn new(engine: AggregationEngine<F>, adapters: Vec<SiteAdapter>) -> Self {
        Self { engine, adapters }
    }

    pub fn adapters(&self) -> &[SiteAdapter] {
        &self.adapters
    }

    /// Restrict the search to the named sites (case-insensitive).
    pub fn only_sites<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, AppError> {
        if names.is_empty() {
            return Ok(self);
        }
        let wanted: Vec<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();
        if let Some(unknown) = wanted
            .iter()
            .find(|w| !self.adapters.iter().any(|a| a.name().to_lowercase() == **w))
        {
            return Err(AppError::ConfigError(format!("Unknown site '{unknown}'")));
        }
        self.adapters
            .retain(|a| wanted.contains(&a.name().to_lowercase()));
        Ok(self)
    }

    /// Normalize `phrase`, search every site, and fail with
    /// [`AppError::NoResults`] when nothing matched anywhere.
    pub async fn search(&self, phrase: &str) -> Result<SearchOutcome, AppError> {
        let query = normalize_phrase(phrase)?;
        let started = Instant::now();

        let report = self.engine.aggregate(&self.adapters, &query).await;
        if report.is_empty() {
            return Err(AppError::NoResults { query });
        }

        Ok(SearchOutcome {
            report,
            elapsed: started.elapsed(),
        })
    }
}

impl SearchOutcome {
    pub fn query(&self) -> &str {
        self.report.query()
    }

    /// Text report followed by the elapsed-time footer.
    pub fn render(&self, include_details: bool) -> String {
        let mut text = ReportFormatter::new()
            .with_details(include_details)
            .format(&self.report, self.query());
        text.push_str(&format!(
            "⏱ Час пошуку: {:.0} сек.",
            self.elapsed.as_secs_f64()
        ));
        text
    }

    pub fn to_json(&self, include_details: bool) -> Result<String, AppError> {
        export::to_json(&self.report, include_details)
    }
}
