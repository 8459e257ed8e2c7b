//! HTTP server setup and the forwarding pipeline.
//!
//! # Responsibilities
//! - Create the Axum router with the single proxy endpoint
//! - Wire up middleware (tracing, request ID, CORS, rate limiting)
//! - Orchestrate one request: validate target, consult cache, forward,
//!   update cache, respond
//!
//! # Pipeline states
//! ```text
//! Validating → CacheCheck → Forwarding → CacheUpdate → Responding
//!      └──────────┴────────────┴──── early exit → Responding(error)
//! ```

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Method, Request, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::cache::ResponseCache;
use crate::config::{LimitsConfig, ProxyConfig};
use crate::http::request::{request_id_middleware, RequestId};
use crate::http::response::{relay_response, CacheStatus};
use crate::lifecycle::wait_for_shutdown;
use crate::observability::metrics;
use crate::proxy::{self, Forwarder, HeaderFilter, ProxyError, UpstreamBody};
use crate::security::{rate_limit_middleware, RateLimiterState};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: ResponseCache,
    pub forwarder: Forwarder,
    pub filter: Arc<HeaderFilter>,
    pub limits: LimitsConfig,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    cache: ResponseCache,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let cache = ResponseCache::new(&config.cache);
        let forwarder = Forwarder::new(&config.upstream)?;
        let filter = Arc::new(HeaderFilter::from_config(&config.headers));

        let state = AppState {
            cache: cache.clone(),
            forwarder,
            filter,
            limits: config.limits.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            cache,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", any(proxy_handler))
            .with_state(state);

        // Innermost layer: denied callers never reach the handler.
        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));
            router = router.layer(axum::middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(cors_layer()),
        )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// No request timeout is applied on purpose: the proxy supports
    /// long-lived upstream responses.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_interval = Duration::from_secs(self.config.cache.sweep_interval_secs);
        self.cache.spawn_sweeper(sweep_interval, shutdown.resubscribe());

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Permissive CORS: the proxy fronts arbitrary origins by design.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Map a body-read failure to its caller-visible error: only the size
/// limit becomes 413, anything else (caller aborted mid-upload) is a
/// plain bad request.
fn classify_body_error(error: axum::Error) -> ProxyError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&error);
    while let Some(current) = source {
        if current
            .downcast_ref::<http_body_util::LengthLimitError>()
            .is_some()
        {
            return ProxyError::BodyTooLarge;
        }
        source = current.source();
    }
    ProxyError::BodyRead
}

/// Extract the target URL from the `url` query parameter.
fn target_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

/// Main proxy handler: runs the pipeline and records the outcome.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method_str = request.method().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_default();

    let response = match run_pipeline(&state, request, &request_id, addr.ip()).await {
        Ok(response) => response,
        Err(error) => {
            match &error {
                ProxyError::UpstreamUnreachable(source) => {
                    tracing::error!(request_id = %request_id, error = %source, "Upstream unreachable");
                }
                other => {
                    tracing::warn!(request_id = %request_id, error = %other, "Request rejected");
                }
            }
            error.into_response()
        }
    };

    metrics::record_request(&method_str, response.status().as_u16(), start_time);
    response
}

/// One pass through the pipeline; every early exit is a `ProxyError`.
async fn run_pipeline(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
    client_ip: IpAddr,
) -> Result<Response, ProxyError> {
    let method = request.method().clone();
    let is_get = method == Method::GET;

    // Every admitted request gets a record, even ones validation rejects.
    let target_raw = target_param(request.uri());
    tracing::info!(
        request_id = %request_id,
        method = %method,
        ip = %client_ip,
        url = target_raw.as_deref().unwrap_or(""),
        "Proxying request"
    );

    // Validating
    let target_raw = target_raw.ok_or(ProxyError::MissingTarget)?;
    let target = proxy::validate_target(&target_raw)?;

    // CacheCheck: GET only; hit skips Forwarding and CacheUpdate entirely.
    if is_get {
        if let Some(entry) = state.cache.get(&target_raw) {
            metrics::record_cache_event("hit");
            return Ok(relay_response(
                entry.status,
                &entry.headers,
                Some(CacheStatus::Hit),
                Body::from(entry.body),
            ));
        }
    }

    // Forwarding
    let (parts, body) = request.into_parts();
    let outbound_headers = state.filter.filter_request(&parts.headers);
    let body_bytes = axum::body::to_bytes(body, state.limits.max_body_bytes)
        .await
        .map_err(classify_body_error)?;

    // Buffer the response only when it may be cached; stream otherwise.
    let upstream = state
        .forwarder
        .forward(method, &target, outbound_headers, body_bytes, is_get)
        .await?;

    let response_headers = state.filter.filter_response(&upstream.headers);

    // CacheUpdate + Responding
    match upstream.body {
        UpstreamBody::Buffered(bytes) => {
            let marker = if is_get && upstream.status.is_success() {
                state.cache.set(
                    target_raw,
                    upstream.status,
                    response_headers.clone(),
                    bytes.clone(),
                );
                metrics::record_cache_event("miss");
                Some(CacheStatus::Miss)
            } else {
                None
            };
            Ok(relay_response(
                upstream.status,
                &response_headers,
                marker,
                Body::from(bytes),
            ))
        }
        UpstreamBody::Streamed(body) => Ok(relay_response(
            upstream.status,
            &response_headers,
            None,
            body,
        )),
    }
}
