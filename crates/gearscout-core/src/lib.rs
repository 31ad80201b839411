pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod reporter;
pub mod scrape;
pub mod search;
pub mod testutil;
pub mod throttle;
pub mod traits;

pub use adapter::SiteAdapter;
pub use aggregate::AggregationEngine;
pub use config::{IdentityPool, RetryConfig, ScoutConfig};
pub use error::AppError;
pub use models::{AggregateReport, Listing, Price, RawListing, SiteContacts, SiteResult};
pub use report::ReportFormatter;
pub use reporter::{NullReporter, ScrapeEvent, ScrapeReporter, TracingReporter};
pub use search::{SearchOutcome, SearchService};
pub use throttle::DelayRange;
pub use traits::{Fetcher, RawResponse};
