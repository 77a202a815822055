//! Unified error types for redletter.
//!
//! Every variant carries a stable code prefix so callers (and logs) can
//! tell failure classes apart without matching on message text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for redletter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query, page zero).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Verse identifier is not of the form `BOOK.CHAPTER.VERSE`.
    #[error("MALFORMED_VERSE_ID: {0}")]
    MalformedVerseId(String),

    /// Quote reference (e.g. `5:3-12`) could not be parsed.
    #[error("INVALID_REFERENCE: {0}")]
    InvalidReference(String),

    /// Book code has no entry in the static book table.
    #[error("UNSUPPORTED_BOOK: {0}")]
    UnsupportedBook(String),

    /// Requested record does not exist.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored JSON column could not be decoded.
    #[error("CACHE_ERROR: corrupt row: {0}")]
    CorruptRow(String),

    /// Remote request timed out.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Remote answered with a non-success status or could not be reached.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Remote payload did not match the expected shape.
    #[error("PARSE_ERROR: {0}")]
    ParseError(String),

    /// API.Bible rejected the key.
    #[error("API_AUTH_ERROR: {0}")]
    ApiAuthError(String),

    /// Configuration is missing or invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CorruptRow(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::MalformedVerseId(msg) => (-32602, format!("malformed verse id: {msg}")),
            Error::InvalidReference(msg) => (-32602, format!("invalid reference: {msg}")),
            Error::UnsupportedBook(msg) => (-32003, format!("unsupported book: {msg}")),
            Error::NotFound(msg) => (-32001, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::ParseError(msg) => (-32008, msg.clone()),
            Error::ApiAuthError(msg) => (-32009, msg.clone()),
            Error::Config(msg) => (-32010, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptRow(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
