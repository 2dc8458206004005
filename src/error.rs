//! Error types for configuration, transport and per-grouping failures

use thiserror::Error;

/// Why a single HTTP exchange with the Pushgateway did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    #[error("unexpected status code {0}")]
    Status(u16),

    /// Connection errors, timeouts and unreadable bodies
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RequestFailure {
    fn from(err: reqwest::Error) -> Self {
        RequestFailure::Transport(err.to_string())
    }
}

/// Errors raised by a prune cycle.
///
/// `FetchFailed` aborts the whole cycle. The other variants are per-grouping
/// and only ever show up inside a [`crate::models::DeleteOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PruneError {
    #[error("GET {url} failed: {cause}")]
    FetchFailed { url: String, cause: RequestFailure },

    #[error("Grouping has no job label")]
    MissingJobLabel,

    #[error("Grouping from job {job} does not have suitable labels (e.g. instance)")]
    MissingDiscriminatingLabel { job: String },

    #[error("DELETE {url} failed: {cause}")]
    DeleteFailed { url: String, cause: RequestFailure },
}

/// Errors building a [`crate::client::PushgatewayClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid Pushgateway URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Startup configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} is not a valid http(s) URL: '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

/// Result type alias using PruneError
pub type Result<T> = std::result::Result<T, PruneError>;
