//! Error types for the API session.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by an [`ApiSession`](crate::ApiSession).
///
/// Only two kinds are externally meaningful: [`ApiError::Transport`] (fatal,
/// never retried) and [`ApiError::Assertion`] (a mismatch detected by an
/// assertion; session state stays readable). The remaining variants are
/// construction or read failures surfaced the same single-shot way.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP transport failed while issuing a request.
    #[error("transport error: {0}")]
    Transport(String),

    /// An assertion over the last response did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A request path or host could not be parsed as a URL.
    #[error("invalid url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A header name or value was not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A body could not be parsed as JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An assertion was invoked before any terminal HTTP call.
    #[error("no response captured yet; issue a request before asserting")]
    NoResponse,
}

impl ApiError {
    /// Builds an assertion failure with the given message.
    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Returns true if this error is an assertion failure.
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }

    /// Returns true if this error came from the transport.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
