//! Error types for the signal engine

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the signal engine
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Provider transport errors
    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Provider request timed out: {0}")]
    ProviderTimeout(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Provider disabled: {0}")]
    ProviderDisabled(String),

    // Parsing errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unexpected response shape: {0}")]
    Schema(String),

    // Filter errors
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    // Collaborator errors
    #[error("Signal store error: {0}")]
    Store(String),

    #[error("Notifier error: {0}")]
    Notify(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Provider(_) | Error::ProviderTimeout(_) | Error::RateLimited(_)
        )
    }

    /// Check if this error is a 429-equivalent rejection
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::ProviderTimeout(e.to_string())
        } else if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            Error::RateLimited(e.to_string())
        } else {
            Error::Provider(e.to_string())
        }
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
