use thiserror::Error;

/// Application-wide error types for gearscout.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (building the client, reading a body, bad URL).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A page kept answering with a transient status past the retry cap.
    #[error("Gave up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    /// A container selector in a site adapter failed to parse.
    #[error("Invalid selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    /// A URL template is missing a required placeholder.
    #[error("Invalid URL template '{template}': missing {placeholder}")]
    InvalidTemplate {
        template: String,
        placeholder: &'static str,
    },

    /// The search phrase is unusable (empty, too short).
    #[error("Invalid search phrase: {0}")]
    InvalidQuery(String),

    /// No site produced a single matching listing.
    #[error("No products found for '{query}'")]
    NoResults { query: String },

    /// Configuration value is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// Returns true for the "nothing found anywhere" outcome, which callers
    /// usually render as a friendly message rather than a failure.
    pub fn is_no_results(&self) -> bool {
        matches!(self, AppError::NoResults { .. })
    }
}
