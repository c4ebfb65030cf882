//! Error handling utilities for the daily-paths reading core.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Not every error reaches a caller. Cache failures (`CacheError`) are absorbed by
//! [`crate::cache::ReadingCache`] and remote failures (`RemoteError`) are folded into
//! reading states by [`crate::resolver::Resolver`]. Only calendar input errors are
//! fatal to the operation that produced them.

use thiserror::Error;

/// Represents malformed calendar input.
///
/// # Examples
///
/// ```
/// use daily_paths::errors::CalendarError;
///
/// let error = CalendarError::InvalidDate { year: 2023, month: 2, day: 29 };
/// assert!(format!("{}", error).contains("2023-02-29"));
///
/// let error = CalendarError::InvalidSlot(400);
/// assert!(format!("{}", error).contains("400"));
/// ```
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The year/month/day combination does not name a real calendar day.
    #[error("Invalid date: {year:04}-{month:02}-{day:02} is not a calendar day")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day-of-month component
        day: u32,
    },

    /// A scheduled slot outside the 1-366 content calendar.
    #[error("Invalid slot: {0} is outside the 1-366 content calendar")]
    InvalidSlot(u32),

    /// Date arithmetic left the representable range.
    #[error("Date out of range: {0}")]
    OutOfRange(String),

    /// A date key that could not be parsed.
    #[error("Invalid date '{input}': {source}. Expected YYYY-MM-DD or YYYYMMDD.")]
    Unparseable {
        /// The text that failed to parse
        input: String,
        /// The underlying chrono error
        #[source]
        source: chrono::ParseError,
    },
}

/// Represents failures of the remote reading source.
///
/// Every variant means "the remote could not answer". A missing row is not an
/// error and is reported as `RemoteFetch { row: None, .. }` instead.
///
/// # Examples
///
/// ```
/// use daily_paths::errors::RemoteError;
///
/// let error = RemoteError::Status { status: 503, body: "unavailable".to_string() };
/// assert!(format!("{}", error).contains("503"));
/// ```
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No endpoint is configured, so the source runs in offline mode.
    #[error("Reading source is not configured. Set DAILY_PATHS_API_URL and DAILY_PATHS_API_KEY to enable remote reads.")]
    NotConfigured,

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Reading source unreachable: {0}. Check your network connection.")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Reading source returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The server answered but the payload could not be understood.
    #[error("Invalid response from reading source: {0}")]
    InvalidResponse(String),
}

/// Represents failures of the local reading cache.
///
/// These never leave the cache layer through `get`/`put`; they are logged and
/// treated as a miss or a no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    /// SQLite error.
    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get cache connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// Stored content could not be encoded or decoded.
    #[error("Cached reading could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking cache task panicked or was cancelled.
    #[error("Cache task failed: {0}")]
    Task(String),
}

/// Represents all possible errors that can occur in the application.
///
/// # Examples
///
/// ```
/// use daily_paths::errors::{AppError, CalendarError};
///
/// let error: AppError = CalendarError::InvalidSlot(0).into();
/// assert!(format!("{}", error).starts_with("Calendar error"));
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed calendar input.
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Remote reading source failures.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Local cache failures surfaced by administrative operations.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use daily_paths::errors::{AppError, AppResult};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Config("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let calendar_error = AppError::Calendar(CalendarError::InvalidDate {
            year: 2023,
            month: 13,
            day: 1,
        });
        assert_eq!(
            format!("{}", calendar_error),
            "Calendar error: Invalid date: 2023-13-01 is not a calendar day"
        );

        let remote_error = AppError::Remote(RemoteError::NotConfigured);
        assert!(format!("{}", remote_error).contains("DAILY_PATHS_API_URL"));
    }

    #[test]
    fn test_remote_error_variants() {
        let error = RemoteError::Status {
            status: 401,
            body: "JWT expired".to_string(),
        };
        assert!(format!("{}", error).contains("HTTP 401"));
        assert!(format!("{}", error).contains("JWT expired"));

        let error = RemoteError::InvalidResponse("expected array".to_string());
        assert!(format!("{}", error).contains("expected array"));
    }

    #[test]
    fn test_cache_error_conversion_to_app_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let cache_error: CacheError = json_error.into();
        let app_error: AppError = cache_error.into();

        match app_error {
            AppError::Cache(CacheError::Serialization(_)) => {}
            other => panic!("Expected AppError::Cache(Serialization), got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_source_chaining() {
        let parse_error = chrono::NaiveDate::parse_from_str("2024-xx-01", "%Y-%m-%d").unwrap_err();
        let error = CalendarError::Unparseable {
            input: "2024-xx-01".to_string(),
            source: parse_error,
        };

        assert!(error.source().is_some());
        assert!(format!("{}", error).contains("2024-xx-01"));
        assert!(format!("{}", error).contains("YYYY-MM-DD"));
    }
}
