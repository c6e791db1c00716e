//! Error types for catalog-pager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here,
//! except the pagination entry points, which wrap the cause in a
//! [`PageLoadError`] so callers see one uniform failure shape.

use std::fmt;
use thiserror::Error;

/// The main error type for catalog-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport / Protocol Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Local Store Errors
    // ============================================================================
    #[error("Merge failed: {message}")]
    Merge { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // Scheduling
    // ============================================================================
    #[error("Load cancelled")]
    Cancelled,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`] as seen by a pagination caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connectivity failure or timeout
    Transport,
    /// Non-success status or an unreadable payload
    Protocol,
    /// Local store transaction failure
    Merge,
    /// The cycle was cancelled before it could merge
    Cancelled,
    /// Anything else (configuration, I/O)
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Merge => "merge",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a merge error
    pub fn merge(message: impl Into<String>) -> Self {
        Self::Merge {
            message: message.into(),
        }
    }

    /// Classify this error for the pagination caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) | Error::Timeout { .. } => ErrorKind::Transport,
            Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::Decode { .. }
            | Error::JsonParse(_) => ErrorKind::Protocol,
            Error::Merge { .. } | Error::Database(_) => ErrorKind::Merge,
            Error::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Other,
        }
    }

    /// Check if the transport layer may retry this error on its own
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for catalog-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Uniform failure of a single pagination cycle.
///
/// Returned by the remote-only pager, the mediator and the cached pager.
/// The engine never retries; the caller decides whether to re-issue the
/// request (see [`PageLoadError::is_retryable`]).
#[derive(Error, Debug)]
#[error("page load failed ({kind}): {cause}")]
pub struct PageLoadError {
    kind: ErrorKind,
    #[source]
    cause: Error,
}

impl PageLoadError {
    /// A failure while applying fetched data to the local store.
    ///
    /// Whatever the cause, the cycle is reported as a merge failure.
    pub fn merge(cause: Error) -> Self {
        Self {
            kind: ErrorKind::Merge,
            cause,
        }
    }

    /// The classification of the underlying cause
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The underlying cause
    pub fn cause(&self) -> &Error {
        &self.cause
    }

    /// Consume and return the underlying cause
    pub fn into_cause(self) -> Error {
        self.cause
    }

    /// Whether re-issuing the same request can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind, ErrorKind::Cancelled | ErrorKind::Other)
    }

    /// Whether the cycle was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}

impl From<PageLoadError> for Error {
    fn from(err: PageLoadError) -> Self {
        err.cause
    }
}

impl From<Error> for PageLoadError {
    fn from(cause: Error) -> Self {
        Self {
            kind: cause.kind(),
            cause,
        }
    }
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
