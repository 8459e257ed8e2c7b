//! Response assembly for relayed upstream responses.
//!
//! # Responsibilities
//! - Write the upstream status and filtered headers to the caller
//! - Attach the cache-status marker on cacheable GET responses
//! - Drop any individual header that fails re-emission, never the whole
//!   response
//!
//! # Design Decisions
//! - Status passes through untouched; upstream 4xx/5xx are not errors here
//! - Once a streamed body is handed to the server there is no second
//!   status/header write; mid-stream failures terminate the connection

use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

/// Header marking whether a GET response was served from cache.
pub const X_PROXY_CACHE: &str = "x-proxy-cache";

/// Cache-status marker attached to GET responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    fn header_value(self) -> HeaderValue {
        match self {
            CacheStatus::Hit => HeaderValue::from_static("HIT"),
            CacheStatus::Miss => HeaderValue::from_static("MISS"),
        }
    }
}

/// Assemble the caller-facing response from relayed parts.
///
/// `headers` must already be hop-by-hop filtered. Each value is re-validated
/// for emission; a header that fails is dropped silently (logged at debug)
/// rather than failing the response.
pub fn relay_response(
    status: StatusCode,
    headers: &HeaderMap,
    cache_status: Option<CacheStatus>,
    body: Body,
) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;

    let out = response.headers_mut();
    for (name, value) in headers.iter() {
        match HeaderValue::from_bytes(value.as_bytes()) {
            Ok(checked) => {
                out.append(name.clone(), checked);
            }
            Err(_) => {
                tracing::debug!(header = %name, "Dropping response header invalid for re-emission");
            }
        }
    }

    if let Some(marker) = cache_status {
        out.insert(X_PROXY_CACHE, marker.header_value());
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_headers_pass_through() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("etag", HeaderValue::from_static("\"abc\""));

        let response = relay_response(
            StatusCode::NOT_FOUND,
            &headers,
            None,
            Body::from("missing"),
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
        assert_eq!(response.headers().get("etag").unwrap(), "\"abc\"");
        assert!(!response.headers().contains_key(X_PROXY_CACHE));
    }

    #[test]
    fn test_cache_markers() {
        let headers = HeaderMap::new();
        let hit = relay_response(StatusCode::OK, &headers, Some(CacheStatus::Hit), Body::empty());
        assert_eq!(hit.headers().get(X_PROXY_CACHE).unwrap(), "HIT");

        let miss = relay_response(StatusCode::OK, &headers, Some(CacheStatus::Miss), Body::empty());
        assert_eq!(miss.headers().get(X_PROXY_CACHE).unwrap(), "MISS");
    }

    #[test]
    fn test_multi_value_headers_preserved() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let response = relay_response(StatusCode::OK, &headers, None, Body::empty());
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
    }
}
