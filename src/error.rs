//! Error types for codeql-report
//!
//! Errors are split by how far they propagate:
//! - [`Error`] aborts the whole run (configuration, file I/O, malformed input, deadline)
//! - [`RowError`] is recorded against a single input row and the run continues
//! - [`FetchError`] describes a failed alert lookup and is always wrapped in a [`RowError`]
//!   by the report generator

use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for codeql-report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error for a report run
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key or flag that caused the error (e.g., "token")
        key: Option<String>,
    },

    /// File could not be opened, created or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File the operation was performed on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Delimited file content is malformed (row width mismatch, bad encoding, etc.)
    #[error("format error in {}{}: {message}", .path.display(), .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Format {
        /// File being read or written
        path: PathBuf,
        /// 1-based line number when known
        line: Option<u64>,
        /// Description of the problem
        message: String,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Run exceeded its overall time budget
    #[error("run exceeded its time budget of {}s", .timeout.as_secs())]
    DeadlineExceeded {
        /// The configured budget
        timeout: Duration,
    },

    /// Run was cancelled by a termination signal
    #[error("run cancelled")]
    Cancelled,
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Convert a `csv` crate error into an I/O or format error for `path`
    pub(crate) fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        let line = err.position().map(|p| p.line());
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Error::Io { path, source },
            _ => Error::Format {
                path,
                line,
                message,
            },
        }
    }

    /// Stable machine-readable code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Io { .. } => "io_error",
            Error::Format { .. } => "format_error",
            Error::Http(_) => "http_client_error",
            Error::DeadlineExceeded { .. } => "deadline_exceeded",
            Error::Cancelled => "cancelled",
        }
    }

    /// Process exit code for this error
    ///
    /// Configuration problems exit with 2 (usage error), everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config { .. } => 2,
            _ => 1,
        }
    }
}

/// Failure of a single alert lookup
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the response body could not be read
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Token was rejected
    #[error("authentication failed: {message}")]
    Unauthorized {
        /// Message returned by the API
        message: String,
    },

    /// Access denied for reasons other than rate limiting
    #[error("access forbidden: {message}")]
    Forbidden {
        /// Message returned by the API
        message: String,
    },

    /// Alert or repository does not exist (or is not visible to the token)
    #[error("alert #{number} not found in {owner}/{repo}")]
    NotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Alert number that was requested
        number: u64,
    },

    /// Any other unsuccessful HTTP status
    #[error("API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message returned by the API
        message: String,
    },

    /// Response body was not a valid alert document
    #[error("failed to decode alert response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rate limit persisted past the configured number of retries
    #[error("rate limit still in effect after {attempts} attempts")]
    RateLimitExhausted {
        /// Total number of requests issued
        attempts: u32,
    },

    /// Alert URL could not be built from the base URL
    #[error("invalid alert URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Owner or repository name would not stay a single path segment
    #[error("alert reference {0} does not name a repository")]
    InvalidTarget(String),
}

/// Reason an input row was skipped
#[derive(Debug, Error)]
pub enum RowError {
    /// Repository field is not `owner/name`
    #[error("invalid repository format: {0:?}")]
    InvalidRepository(String),

    /// Alert number field is not a non-negative integer
    #[error("failed to parse alert number {value:?}: {source}")]
    InvalidAlertNumber {
        /// Raw field value
        value: String,
        /// Parse failure
        #[source]
        source: ParseIntError,
    },

    /// Remote lookup failed
    #[error("failed to get alert #{number} for {repository}: {source}")]
    Fetch {
        /// `owner/name` of the repository
        repository: String,
        /// Alert number
        number: u64,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },
}
