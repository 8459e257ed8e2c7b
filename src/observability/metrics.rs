//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): total requests by method, status
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_cache_events_total` (counter): cache hits and misses
//! - `proxy_rate_limited_total` (counter): requests rejected by the limiter
//! - `proxy_cache_entries` (gauge): current cache size
//!
//! # Design Decisions
//! - Low-overhead updates via the `metrics` facade; recording is a no-op
//!   until an exporter is installed, so tests and library consumers pay
//!   nothing
//! - Prometheus exposition on a separate listener, enabled by config

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed proxy request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}

/// Record a cache lookup outcome ("hit" or "miss").
pub fn record_cache_event(outcome: &'static str) {
    counter!("proxy_cache_events_total", "outcome" => outcome).increment(1);
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    counter!("proxy_rate_limited_total").increment(1);
}

/// Record the current number of cache entries.
pub fn record_cache_size(len: usize) {
    gauge!("proxy_cache_entries").set(len as f64);
}
