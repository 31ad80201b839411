use std::sync::Arc;

use gearscout_core::testutil::{MockFetcher, RecordingReporter, product_page, stock_item};
use gearscout_core::{AggregationEngine, DelayRange, RawResponse, RetryConfig, ScoutConfig};

/// Config with no real waiting: no page delay, no backoff, one retry.
pub fn fast_config() -> ScoutConfig {
    ScoutConfig::default()
        .with_page_delay(DelayRange::none())
        .with_retry(RetryConfig {
            backoff: DelayRange::none(),
            max_retries: Some(1),
        })
        .with_deadline(None)
}

pub fn engine(mock: MockFetcher) -> (AggregationEngine<MockFetcher>, RecordingReporter) {
    let reporter = RecordingReporter::default();
    let engine =
        AggregationEngine::new(mock, fast_config()).with_reporter(Arc::new(reporter.clone()));
    (engine, reporter)
}

/// A results page of in-stock items.
pub fn page(items: &[(&str, &str)]) -> RawResponse {
    let items: Vec<String> = items
        .iter()
        .map(|(name, price)| stock_item(name, price, true))
        .collect();
    RawResponse::ok(product_page(&items))
}
