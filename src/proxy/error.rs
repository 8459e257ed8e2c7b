//! Error taxonomy for the forwarding pipeline.
//!
//! # Design Decisions
//! - Upstream-returned HTTP statuses (4xx/5xx) are NOT errors; they are
//!   relayed verbatim. Only transport-level failures become `ProxyError`.
//! - Callers never see internal detail: the caller-visible message is the
//!   short phrase below, the full source error goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors produced by the proxy pipeline, each mapped to a caller-visible
/// status and short message at the handler boundary.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No `url` query parameter was supplied.
    #[error("Target URL not provided")]
    MissingTarget,

    /// The supplied target failed to parse as an absolute URL.
    #[error("Invalid URL format")]
    InvalidTarget,

    /// Transport-level failure contacting the target (DNS, connect, reset,
    /// malformed response). The source error is logged, never leaked.
    #[error("Error fetching the requested URL")]
    UpstreamUnreachable(#[source] reqwest::Error),

    /// Inbound body exceeded the configured size limit.
    #[error("Request body too large")]
    BodyTooLarge,

    /// Inbound body could not be read (caller aborted mid-upload).
    #[error("Failed to read request body")]
    BodyRead,
}

impl ProxyError {
    /// HTTP status returned to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingTarget | ProxyError::InvalidTarget => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BodyRead => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::MissingTarget.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::InvalidTarget.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::BodyTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ProxyError::BodyRead.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_messages_are_generic() {
        // Caller-visible text must not contain transport detail.
        assert_eq!(ProxyError::MissingTarget.to_string(), "Target URL not provided");
        assert_eq!(ProxyError::InvalidTarget.to_string(), "Invalid URL format");
    }
}
