//! Test utilities: mock transport, recording reporter, and HTML fixtures.
//!
//! Handwritten mocks for dependency injection in unit and integration
//! tests. All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scraper::Selector;

use crate::adapter::SiteAdapter;
use crate::error::AppError;
use crate::models::RawListing;
use crate::reporter::{ScrapeEvent, ScrapeReporter};
use crate::traits::{Fetcher, RawResponse};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockState {
    /// Returned on every call to the URL once its queue is drained.
    pages: HashMap<String, RawResponse>,
    /// Consumed one per call before falling back to `pages`.
    queued: HashMap<String, VecDeque<Result<RawResponse, AppError>>>,
    latency: HashMap<String, Duration>,
    calls: Vec<(String, String)>,
}

/// Mock transport with per-URL scripted responses.
///
/// Unknown URLs answer 404, so a site "runs out of pages" naturally.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<MockState>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `url` with `response`.
    pub fn with_page(self, url: impl Into<String>, response: RawResponse) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.into(), response);
        self
    }

    /// Answer `url` with `responses` in order, then fall back to
    /// [`with_page`](Self::with_page) or 404.
    pub fn with_sequence(
        self,
        url: impl Into<String>,
        responses: Vec<Result<RawResponse, AppError>>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .queued
            .insert(url.into(), responses.into());
        self
    }

    /// Delay every answer for `url`.
    pub fn with_latency(self, url: impl Into<String>, latency: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .latency
            .insert(url.into(), latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(u, _)| u == url)
            .count()
    }

    pub fn urls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(u, _)| u.clone())
            .collect()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, ua)| ua.clone())
            .collect()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<RawResponse, AppError> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((url.to_string(), user_agent.to_string()));
            state.latency.get(url).copied()
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(next) = state.queued.get_mut(url).and_then(VecDeque::pop_front) {
            return next;
        }
        Ok(state
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| RawResponse::status(404)))
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Reporter that records `(kind, site)` for every event.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<(&'static str, Option<String>)>>>,
}

impl RecordingReporter {
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Sites that emitted an event of `kind`, in emission order.
    pub fn sites_for(&self, kind: &str) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .filter_map(|(_, site)| site.clone())
            .collect()
    }
}

impl ScrapeReporter for RecordingReporter {
    fn report(&self, event: ScrapeEvent<'_>) {
        let site = event.site().map(str::to_string);
        self.events.lock().unwrap().push((event.kind(), site));
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Adapter for the fixture markup produced by [`product_page`].
///
/// URLs look like `https://<name>.example/search?q=<query>&page=<n>`.
pub fn fixture_adapter(name: &str) -> SiteAdapter {
    let host = name.to_lowercase().replace(' ', "-");
    let name_sel = Selector::parse(".name").unwrap();
    let price_sel = Selector::parse(".price").unwrap();
    let out_sel = Selector::parse(".out-of-stock").unwrap();

    SiteAdapter::new(
        name,
        format!("https://{host}.example/search?q={{query}}&page={{page}}"),
        format!("https://{host}.example/search?q={{query}}"),
        "+",
        ".product",
        move |container| {
            let name = container.select(&name_sel).next()?.text().collect::<String>();
            let price = container
                .select(&price_sel)
                .next()
                .map(|p| p.text().collect::<String>())
                .unwrap_or_default();
            let in_stock = container.select(&out_sel).next().is_none();
            Some(RawListing::new(name, price, in_stock))
        },
    )
    .unwrap()
}

/// Markup for one product container understood by [`fixture_adapter`].
pub fn stock_item(name: &str, price: &str, in_stock: bool) -> String {
    let stock = if in_stock {
        r#"<button class="buy">Купити</button>"#
    } else {
        r#"<span class="out-of-stock">Немає в наявності</span>"#
    };
    format!(
        r#"<div class="product"><h4 class="name">{name}</h4><span class="price">{price}</span>{stock}</div>"#
    )
}

/// A whole results page wrapping `items`.
pub fn product_page(items: &[String]) -> String {
    format!(
        "<html><head><title>Search</title></head><body><div class=\"results\">{}</div></body></html>",
        items.concat()
    )
}
