//! Outbound request forwarding.
//!
//! # Responsibilities
//! - Build the outbound request from the validated URL, filtered headers,
//!   and original method/body
//! - Pool and reuse upstream connections (keep-alive)
//! - Relay any upstream HTTP status verbatim; surface only transport
//!   failures as errors
//!
//! # Design Decisions
//! - No timeout on the outbound call: the proxy must support long-lived
//!   upstream responses. Callers needing bounded latency enforce it
//!   themselves.
//! - A semaphore caps concurrent outbound sockets; overflow queues rather
//!   than rejects.
//! - The Host header is derived from the target URL by the client, so
//!   virtual-hosted upstreams route correctly.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode};
use futures_util::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;

/// An upstream response, with the body either fully buffered (cacheable) or
/// left as a stream to be piped through to the caller.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

pub enum UpstreamBody {
    /// Complete body, byte-exact, safe to cache.
    Buffered(Bytes),
    /// Incrementally piped to the caller; cannot be cached.
    Streamed(Body),
}

/// Shared outbound HTTP client with pooled connections.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    /// Bounds in-flight upstream requests; waiting is backpressure, not an error.
    permits: Arc<Semaphore>,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.max_sockets)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_secs))
            .build()?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_sockets)),
        })
    }

    /// Forward a request upstream.
    ///
    /// `buffer_body` selects the capability branch: buffered whenever the
    /// response may be cached (GET), streamed otherwise. Any HTTP status the
    /// upstream returns is a success at this layer.
    pub async fn forward(
        &self,
        method: Method,
        target: &Url,
        headers: HeaderMap,
        body: Bytes,
        buffer_body: bool,
    ) -> Result<UpstreamResponse, ProxyError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore closed unexpectedly");

        let response = self
            .client
            .request(method, target.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(ProxyError::UpstreamUnreachable)?;

        let status = response.status();
        let headers = response.headers().clone();

        let body = if buffer_body {
            let bytes = response
                .bytes()
                .await
                .map_err(ProxyError::UpstreamUnreachable)?;
            UpstreamBody::Buffered(bytes)
        } else {
            // Mid-stream failures surface as I/O errors on the caller's
            // connection; headers are already sent by then, so there is no
            // second status write (headers-already-sent guard). The socket
            // permit rides along until the stream is fully drained or dropped.
            let stream = response
                .bytes_stream()
                .map_err(std::io::Error::other)
                .inspect_ok(move |_| {
                    let _ = &permit;
                });
            UpstreamBody::Streamed(Body::from_stream(stream))
        };

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}
