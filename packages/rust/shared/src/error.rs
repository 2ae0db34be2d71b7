//! Error types for leadenrich.
//!
//! Library crates use [`EnrichError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::MissingCredential;

/// Maximum number of characters of oracle output kept in a
/// [`EnrichError::MalformedOracleResponse`] excerpt.
const EXCERPT_CHARS: usize = 200;

/// Top-level error type for all leadenrich operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A required API key or secret is not set. Raised before any network call.
    #[error("missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    /// An external service answered with a non-success response.
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Transport-level HTTP failure.
    #[error("network error: {0}")]
    Network(String),

    /// The oracle conversation failed (transport aside).
    #[error("oracle error: {0}")]
    Oracle(String),

    /// The oracle answered, but its text is not a record after cleaning.
    #[error("malformed oracle response: {message} (got: {excerpt})")]
    MalformedOracleResponse { message: String, excerpt: String },

    /// Generic parse error (provider payloads, input files).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Data validation error (bad input, unusable URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The record carries no profile URL, full name, or company name.
    #[error("record has no anchor field (profile_url, full_name or company_name)")]
    NoAnchorData,

    /// The per-invocation deadline elapsed.
    #[error("enrichment deadline of {after:?} exceeded")]
    DeadlineExceeded { after: Duration },

    /// A batch worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Task(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EnrichError>;

impl EnrichError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a malformed-oracle-response error, keeping a short excerpt of `raw`.
    pub fn malformed(msg: impl Into<String>, raw: &str) -> Self {
        Self::MalformedOracleResponse {
            message: msg.into(),
            excerpt: raw.chars().take(EXCERPT_CHARS).collect(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<MissingCredential> for EnrichError {
    fn from(err: MissingCredential) -> Self {
        Self::MissingCredential { var: err.var }
    }
}
