//! Forwarding HTTP proxy library.
//!
//! A single-endpoint proxy: any request to `/` carrying a `url` query
//! parameter is relayed to that target with sanitized headers, GET
//! responses are cached with a TTL, and results stream back to the caller
//! with no outbound timeout.
//!
//! ```text
//! inbound request
//!     → rate limit gate (429 on deny)
//!     → proxy handler
//!         → validate target URL
//!         → cache check (GET)        ── hit → respond (X-Proxy-Cache: HIT)
//!         → header filter (hop-by-hop, host)
//!         → forwarder (pooled client, no timeout)
//!         → cache update (GET + 2xx, X-Proxy-Cache: MISS)
//!     → response written to caller
//! ```

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;

pub use cache::ResponseCache;
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
