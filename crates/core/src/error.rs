//! Unified error types for magpie.
//!
//! Per-attempt proxy failures never reach this type; they are absorbed by the
//! fetcher and only the aggregate `AllProxiesExhausted` is surfaced.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the magpie server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown word id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Every configured proxy failed for this request.
    #[error("ALL_PROXIES_EXHAUSTED: {0}")]
    AllProxiesExhausted(String),

    /// No path produced readable content for the article.
    #[error("ARTICLE_UNAVAILABLE: {0}")]
    ArticleUnavailable(Box<Error>),

    /// Content extraction failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// HTTP client could not be constructed.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// No cache entry found for the given URL.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Write rejected because the cache is at its entry quota.
    #[error("CACHE_ERROR: quota of {0} entries reached")]
    QuotaExceeded(usize),
}

impl Error {
    /// Wrap a terminal fetch or extraction failure for the caller.
    pub fn unavailable(cause: Error) -> Self {
        match cause {
            Error::ArticleUnavailable(_) => cause,
            other => Error::ArticleUnavailable(Box::new(other)),
        }
    }
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

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::AllProxiesExhausted(msg) => (-32006, msg.clone()),
            Error::ArticleUnavailable(cause) => (-32007, cause.to_string()),
            Error::ExtractFailed(msg) => (-32000, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::QuotaExceeded(_) => (-32002, err.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CacheMiss("https://example.com".to_string());
        assert!(err.to_string().contains("CACHE_MISS"));
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn test_unavailable_wraps_cause() {
        let err = Error::unavailable(Error::AllProxiesExhausted("2 proxies failed".into()));
        let text = err.to_string();
        assert!(text.starts_with("ARTICLE_UNAVAILABLE"));
        assert!(text.contains("ALL_PROXIES_EXHAUSTED"));
    }

    #[test]
    fn test_unavailable_does_not_double_wrap() {
        let inner = Error::unavailable(Error::ExtractFailed("empty".into()));
        let outer = Error::unavailable(inner);
        match outer {
            Error::ArticleUnavailable(cause) => assert!(matches!(*cause, Error::ExtractFailed(_))),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::CacheMiss("abc123".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let err = Error::unavailable(Error::AllProxiesExhausted("none".into()));
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32007);
    }
}
