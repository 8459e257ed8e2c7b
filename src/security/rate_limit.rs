//! Per-IP rate limiting middleware.
//!
//! Fixed-window counting: each caller IP gets `max_requests` admissions per
//! `window_ms` window; the counter resets when a window elapses. Denied
//! requests receive 429 and never reach the proxy handler.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// A single caller's window counter.
struct Window {
    started: Instant,
    count: u32,
}

/// Per-IP windows plus the last time expired ones were swept out.
struct Windows {
    map: HashMap<IpAddr, Window>,
    last_prune: Instant,
}

/// State for the fixed-window rate limiter.
pub struct RateLimiterState {
    windows: Mutex<Windows>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(Windows {
                map: HashMap::new(),
                last_prune: Instant::now(),
            }),
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
        }
    }

    /// Admit or reject one request from `ip`.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        // Sweep expired windows at most once per window so idle IPs do not
        // accumulate for the process lifetime.
        if now.duration_since(windows.last_prune) >= self.window {
            let window = self.window;
            windows
                .map
                .retain(|_, w| now.duration_since(w.started) < window);
            windows.last_prune = now;
        }

        let window = windows.map.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.windows
            .lock()
            .expect("rate limiter mutex poisoned")
            .map
            .len()
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.check(addr.ip()) {
        next.run(request).await
    } else {
        tracing::warn!(client = %addr.ip(), "Rate limit exceeded");
        metrics::record_rate_limited();
        let mut response = Response::new(Body::from("Too many requests"));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}
