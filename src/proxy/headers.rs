//! Header filtering for forwarded requests and relayed responses.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers (RFC 9110 §7.6.1) in both directions
//! - Strip `host` from the outbound request (the client sets the target's
//!   own host, never the proxy's inbound one)
//! - Optional privacy stripping (`referer`, `user-agent`) via config
//!
//! # Design Decisions
//! - The strip set is policy supplied at construction, not a hardcoded
//!   constant; the hop-by-hop set is always included.
//! - Filtering returns a new `HeaderMap`; the input is never mutated.

use axum::http::header::HeaderName;
use axum::http::HeaderMap;
use std::collections::HashSet;

use crate::config::HeaderPolicyConfig;

/// Hop-by-hop headers that must never cross the proxy in either direction.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Header-stripping policy applied to requests and responses.
///
/// Built once at startup from [`HeaderPolicyConfig`] and shared read-only
/// across all in-flight requests.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    /// Names stripped from the outbound request (hop-by-hop + host + extras).
    request_strip: HashSet<HeaderName>,
    /// Names stripped from the relayed response (hop-by-hop only).
    response_strip: HashSet<HeaderName>,
}

impl HeaderFilter {
    pub fn from_config(config: &HeaderPolicyConfig) -> Self {
        let hop_by_hop: Vec<HeaderName> = HOP_BY_HOP_HEADERS
            .iter()
            .map(|name| HeaderName::from_static(name))
            .collect();

        let mut request_strip: HashSet<HeaderName> = hop_by_hop.iter().cloned().collect();
        if config.strip_host {
            request_strip.insert(HeaderName::from_static("host"));
        }
        for name in &config.strip_request_extra {
            // Invalid names in config are ignored; validation warns about them.
            if let Ok(parsed) = name.parse::<HeaderName>() {
                request_strip.insert(parsed);
            }
        }

        Self {
            request_strip,
            response_strip: hop_by_hop.into_iter().collect(),
        }
    }

    /// Filter the inbound header set before building the outbound request.
    pub fn filter_request(&self, headers: &HeaderMap) -> HeaderMap {
        Self::retain(headers, &self.request_strip)
    }

    /// Filter the upstream response header set before writing to the caller.
    pub fn filter_response(&self, headers: &HeaderMap) -> HeaderMap {
        Self::retain(headers, &self.response_strip)
    }

    fn retain(headers: &HeaderMap, strip: &HashSet<HeaderName>) -> HeaderMap {
        let mut filtered = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            if !strip.contains(name) {
                filtered.append(name.clone(), value.clone());
            }
        }
        filtered
    }
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self::from_config(&HeaderPolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::HeaderValue;

    fn sample_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("upgrade", HeaderValue::from_static("h2c"));
        headers.insert("host", HeaderValue::from_static("proxy.local:2208"));
        headers.insert("accept", HeaderValue::from_static("*/*"));
        headers.insert("authorization", HeaderValue::from_static("Bearer tok"));
        headers
    }

    #[test]
    fn test_request_filter_strips_hop_by_hop_and_host() {
        let filter = HeaderFilter::default();
        let filtered = filter.filter_request(&sample_headers());

        for name in HOP_BY_HOP_HEADERS {
            assert!(!filtered.contains_key(name), "{name} should be stripped");
        }
        assert!(!filtered.contains_key("host"));
        assert_eq!(filtered.get("accept").unwrap(), "*/*");
        assert_eq!(filtered.get("authorization").unwrap(), "Bearer tok");
    }

    #[test]
    fn test_response_filter_keeps_host_strips_hop_by_hop() {
        let filter = HeaderFilter::default();
        let filtered = filter.filter_response(&sample_headers());

        for name in HOP_BY_HOP_HEADERS {
            assert!(!filtered.contains_key(name));
        }
        // host is a request-side concern only
        assert!(filtered.contains_key("host"));
    }

    #[test]
    fn test_privacy_extras() {
        let mut headers = sample_headers();
        headers.insert("referer", HeaderValue::from_static("http://a.example/"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let config = HeaderPolicyConfig {
            strip_request_extra: vec!["referer".into(), "user-agent".into()],
            ..Default::default()
        };
        let filtered = HeaderFilter::from_config(&config).filter_request(&headers);
        assert!(!filtered.contains_key("referer"));
        assert!(!filtered.contains_key("user-agent"));
    }

    #[test]
    fn test_input_not_mutated_and_multi_values_kept() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("connection", HeaderValue::from_static("close"));

        let filter = HeaderFilter::default();
        let filtered = filter.filter_response(&headers);

        assert_eq!(filtered.get_all("set-cookie").iter().count(), 2);
        // original untouched
        assert!(headers.contains_key("connection"));
    }

    #[test]
    fn test_absent_keys_are_noops() {
        let filter = HeaderFilter::default();
        let filtered = filter.filter_request(&HeaderMap::new());
        assert!(filtered.is_empty());
    }
}
