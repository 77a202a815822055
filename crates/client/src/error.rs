//! Remote API error types.

use std::sync::Arc;

use redletter_core::Error;

/// Errors from the verse CDN and API.Bible clients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// API.Bible key not configured.
    #[error("missing API key: REDLETTER_API_BIBLE_KEY not set")]
    MissingApiKey,

    /// Request parameters out of range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Base URL could not be parsed or extended.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the remote.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Remote answered but the verse text was empty.
    #[error("verse text is empty")]
    EmptyVerse,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ApiError::Timeout } else { ApiError::Network(Arc::new(err)) }
    }
}

impl ApiError {
    /// Map a non-success status code to an error.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ApiError::AuthError,
            429 => ApiError::RateLimited,
            _ => ApiError::HttpError { status },
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingApiKey | ApiError::AuthError => Error::ApiAuthError(err.to_string()),
            ApiError::Timeout => Error::FetchTimeout(err.to_string()),
            ApiError::Parse(msg) => Error::ParseError(msg),
            ApiError::EmptyVerse => Error::NotFound(err.to_string()),
            ApiError::InvalidUrl(msg) => Error::Config(msg),
            ApiError::InvalidRequest(msg) => Error::InvalidInput(msg),
            ApiError::RateLimited | ApiError::HttpError { .. } | ApiError::Network(_) => {
                Error::HttpError(err.to_string())
            }
        }
    }
}
