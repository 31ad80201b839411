use std::time::Duration;

use gearscout_core::error::AppError;
use gearscout_core::traits::{Fetcher, RawResponse};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

/// HTTP transport using reqwest.
///
/// One GET per call with the caller's User-Agent. Non-2xx answers are
/// returned as-is: classifying them is the engine's job, not the
/// transport's.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<RawResponse, AppError> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "uk-UA,uk;q=0.9,en;q=0.5")
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(e))?;

        tracing::trace!(%url, %status, bytes = body.len(), "HTTP response");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

impl ReqwestFetcher {
    fn map_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else if e.is_body() || e.is_decode() {
            AppError::NetworkError(format!("Failed to read response body: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }
}

/// Only absolute `http`/`https` URLs with a host are fetched.
fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::HttpError(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(AppError::HttpError("URL has no host".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        let err = validate_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("not allowed"));
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("https://ataka.com.ua/search?q=belt").is_ok());
    }

    #[tokio::test]
    async fn sends_user_agent_and_returns_body() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "belt"))
            .and(header("user-agent", "TestAgent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = ReqwestFetcher::new()?;
        let response = fetcher
            .fetch(&format!("{}/search?q=belt", server.uri()), "TestAgent/1.0")
            .await?;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<html>ok</html>");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_not_an_error() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let response = ReqwestFetcher::new()?
            .fetch(&format!("{}/page/9", server.uri()), "ua")
            .await?;
        assert_eq!(response.status, 404);
        Ok(())
    }

    #[tokio::test]
    async fn slow_server_times_out() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let err = ReqwestFetcher::with_timeout(Duration::from_secs(1))?
            .fetch(&server.uri(), "ua")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(1)));
        assert!(err.is_retryable());
        Ok(())
    }

    #[tokio::test]
    async fn refused_connection_is_retryable() -> anyhow::Result<()> {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);

        let err = ReqwestFetcher::new()?
            .fetch(&format!("http://127.0.0.1:{port}/"), "ua")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        Ok(())
    }
}
