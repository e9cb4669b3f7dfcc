//! Typed errors for the search-and-extract pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! classify failures without string matching.

use thiserror::Error;

/// Failures talking to an external collaborator (search backend or
/// rendering service).
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Collaborator answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Payload did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl UpstreamError {
    pub(crate) fn http(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Http(Box::new(err))
    }
}

/// Errors surfaced by [`Pipeline`](crate::Pipeline) entry points.
///
/// Per-URL render failures are never represented here: they are reported
/// as data in [`AggregatedResult::failed_urls`](crate::AggregatedResult).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Search or renderer outage
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Search returned an empty result set
    #[error("No search results found")]
    NoResults,

    /// Search returned results, but none carried a URL
    #[error("No valid URLs found")]
    NoValidUrls,

    /// Every URL failed both fetch passes
    #[error("All URL crawls failed")]
    AllFetchesFailed { failed_urls: Vec<String> },

    /// Request rejected before any collaborator was called
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl PipelineError {
    /// HTTP status equivalent for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Upstream(_) => 502,
            Self::NoResults | Self::NoValidUrls => 404,
            Self::AllFetchesFailed { .. } => 500,
            Self::InvalidRequest { .. } => 422,
        }
    }

    /// Stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "upstream_error",
            Self::NoResults => "no_results",
            Self::NoValidUrls => "no_valid_urls",
            Self::AllFetchesFailed { .. } => "all_fetches_failed",
            Self::InvalidRequest { .. } => "invalid_request",
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for collaborator calls.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;
