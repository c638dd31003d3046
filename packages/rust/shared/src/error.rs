//! Error types for the franchise workspace.
//!
//! Library crates use [`FranchiseError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all franchise operations.
#[derive(Debug, thiserror::Error)]
pub enum FranchiseError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure or non-success status from the upstream site.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream site did not answer within the request timeout.
    #[error("upstream timeout: {0}")]
    Timeout(String),

    /// The search step returned no result for the query.
    #[error("no title found for query '{query}'")]
    SeedNotFound { query: String },

    /// Every fetch failed, the seed included.
    #[error("could not extract franchise data from {seed}")]
    NoData { seed: String },

    /// Request validation error (missing or empty input).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A page task ended without producing an outcome (it panicked or was cancelled).
    #[error("page task aborted: {0}")]
    TaskAborted(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FranchiseError>;

impl FranchiseError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a failed request to `url`: timeouts become [`Self::Timeout`],
    /// everything else [`Self::Network`].
    pub fn from_reqwest(url: impl std::fmt::Display, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout(format!("{url}: {source}"))
        } else {
            Self::Network(format!("{url}: {source}"))
        }
    }

    /// True for errors caused by the upstream site being slow or unreachable.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
