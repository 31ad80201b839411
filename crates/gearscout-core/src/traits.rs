use std::future::Future;

use crate::error::AppError;

/// Status line and body of one HTTP response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn status(status: u16) -> Self {
        Self::new(status, Vec::new())
    }
}

/// Issues one HTTP GET with the given client identity.
///
/// Implementations report every status they receive; deciding what a
/// status means (retry, stop, use the body) is the job of
/// [`PageFetcher`](crate::fetch::PageFetcher).
pub trait Fetcher: Send + Sync + Clone + 'static {
    fn fetch(
        &self,
        url: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<RawResponse, AppError>> + Send;
}
