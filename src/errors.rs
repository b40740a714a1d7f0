// Error taxonomy. Per-meeting and per-course failures are recoverable and
// recorded in place; only total catalog unavailability is a hard failure.

use thiserror::Error;

/// Typed failures from the time & day normalizer. Callers mark the affected
/// meeting non-schedulable instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unparseable time: {0:?}")]
    UnparseableTime(String),
    #[error("unparseable day: {0:?}")]
    UnparseableDay(String),
}

/// Catalog availability and feed-loading failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Fatal to the request, not to the process; retryable once a refresh
    /// succeeds.
    #[error("catalog not loaded")]
    NotLoaded,
    #[error("failed to read catalog feed {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog feed {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Problems with an incoming API request body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("unknown core code: {0:?}")]
    UnknownCore(String),
}
