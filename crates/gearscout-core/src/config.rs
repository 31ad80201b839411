use std::time::Duration;

use rand::seq::SliceRandom;

use crate::error::AppError;
use crate::throttle::DelayRange;

/// Browser identities rotated across requests.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:100.0) Gecko/20100101 Firefox/100.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.1 Safari/605.1.15",
    "Mozilla/5.0 (Linux; Android 11; Pixel 4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.1234.56 Mobile Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; Trident/7.0; rv:11.0) like Gecko",
];

/// Pool of client identity strings (User-Agent values).
///
/// One is picked at random per request. This only defeats naive
/// per-identity blocking and has no security value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPool {
    agents: Vec<String>,
}

impl IdentityPool {
    /// Returns `ConfigError` for an empty pool.
    pub fn new<I, S>(agents: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .filter(|a: &String| !a.trim().is_empty())
            .collect();
        if agents.is_empty() {
            return Err(AppError::ConfigError(
                "identity pool needs at least one user agent".into(),
            ));
        }
        Ok(Self { agents })
    }

    pub fn pick(&self) -> &str {
        self.agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Retry policy for transient page statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Randomized pause before each retry.
    pub backoff: DelayRange,
    /// `None` retries until the caller's deadline cancels the search.
    pub max_retries: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff: DelayRange::retry_backoff(),
            max_retries: None,
        }
    }
}

/// Runtime configuration for one search engine instance.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub identities: IdentityPool,
    /// Pause between consecutive result pages of one site.
    pub page_delay: DelayRange,
    pub retry: RetryConfig,
    /// Upper bound on a whole aggregate run; unfinished sites are dropped.
    pub search_deadline: Option<Duration>,
    /// Per-request HTTP timeout for the transport.
    pub request_timeout: Duration,
    /// Whether reports include per-listing detail by default.
    pub include_details: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            identities: IdentityPool::default(),
            page_delay: DelayRange::politeness(),
            retry: RetryConfig::default(),
            search_deadline: Some(Duration::from_secs(120)),
            request_timeout: Duration::from_secs(30),
            include_details: false,
        }
    }
}

impl ScoutConfig {
    /// Read overrides from environment variables on top of the defaults.
    ///
    /// - `GEARSCOUT_DEADLINE_SECS` (0 disables the deadline)
    /// - `GEARSCOUT_MAX_RETRIES`
    /// - `GEARSCOUT_REQUEST_TIMEOUT_SECS`
    /// - `GEARSCOUT_PAGE_DELAY_MS` (`min-max` or a single value)
    /// - `GEARSCOUT_USER_AGENTS` (`|`-separated)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("GEARSCOUT_DEADLINE_SECS") {
            let secs = parse_u64("GEARSCOUT_DEADLINE_SECS", &raw)?;
            config.search_deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = lookup("GEARSCOUT_MAX_RETRIES") {
            let retries = parse_u64("GEARSCOUT_MAX_RETRIES", &raw)?;
            config.retry.max_retries = Some(u32::try_from(retries).map_err(|_| {
                AppError::ConfigError(format!("GEARSCOUT_MAX_RETRIES '{raw}' is too large"))
            })?);
        }

        if let Some(raw) = lookup("GEARSCOUT_REQUEST_TIMEOUT_SECS") {
            let secs = parse_u64("GEARSCOUT_REQUEST_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(AppError::ConfigError(
                    "GEARSCOUT_REQUEST_TIMEOUT_SECS must be at least 1".into(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("GEARSCOUT_PAGE_DELAY_MS") {
            config.page_delay = DelayRange::parse_millis(&raw).ok_or_else(|| {
                AppError::ConfigError(format!(
                    "Invalid GEARSCOUT_PAGE_DELAY_MS '{raw}': expected '<min>-<max>' in milliseconds"
                ))
            })?;
        }

        if let Some(raw) = lookup("GEARSCOUT_USER_AGENTS") {
            config.identities = IdentityPool::new(raw.split('|').map(str::trim))?;
        }

        Ok(config)
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.search_deadline = deadline;
        self
    }

    pub fn with_page_delay(mut self, delay: DelayRange) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_details(mut self, include_details: bool) -> Self {
        self.include_details = include_details;
        self
    }
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {key} '{raw}': must be a non-negative integer"
        ))
    })
}
