//! Forwarding pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted request:
//!     → validate_target (absolute URL, http/https, host present)
//!     → headers.rs (strip hop-by-hop + policy extras)
//!     → forwarder.rs (pooled outbound call, no timeout)
//!     → headers.rs (strip hop-by-hop from the response)
//!     → relay to caller
//! ```
//!
//! # Design Decisions
//! - Upstream statuses pass through untouched; only transport failures map
//!   to an error status
//! - Single upstream attempt per inbound request, no retries

pub mod error;
pub mod forwarder;
pub mod headers;

pub use error::ProxyError;
pub use forwarder::{Forwarder, UpstreamBody, UpstreamResponse};
pub use headers::{HeaderFilter, HOP_BY_HOP_HEADERS};

use url::Url;

/// Parse and validate a target URL from the `url` query parameter.
///
/// The target must be an absolute http(s) URL with a host.
pub fn validate_target(raw: &str) -> Result<Url, ProxyError> {
    let url = Url::parse(raw).map_err(|_| ProxyError::InvalidTarget)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ProxyError::InvalidTarget);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_targets() {
        assert!(validate_target("http://example.com").is_ok());
        assert!(validate_target("https://example.com/path?a=1&b=2").is_ok());
        assert!(validate_target("http://127.0.0.1:8080/x").is_ok());
    }

    #[test]
    fn test_invalid_targets() {
        // Relative and scheme-less strings do not parse as absolute URLs.
        assert!(validate_target("/just/a/path").is_err());
        assert!(validate_target("example.com/no-scheme").is_err());
        assert!(validate_target("not a url").is_err());
        // Parses, but has no host / wrong scheme.
        assert!(validate_target("mailto:user@example.com").is_err());
        assert!(validate_target("file:///etc/passwd").is_err());
        assert!(validate_target("unix:/var/run/sock").is_err());
    }

    #[test]
    fn test_query_is_preserved() {
        let url = validate_target("http://example.com/x?b=2&a=1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/x?b=2&a=1");
    }
}
