//! HTTP routing configuration with the conventional middleware stack.
//!
//! Middleware is attached in a fixed order: request tracing, timeout,
//! body-size limit, CORS, and (optionally) per-IP rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Request, Response, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
};
use governor::{Quota, RateLimiter};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;
use crate::domain::AppError;

use super::handlers::{
    fallback_handler, health_handler, liveness_handler, metrics_handler, openapi_handler,
    readiness_handler, upload_handler,
};

/// Maximum accepted request body size (uploads included).
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Per-request timeout for every route.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for general endpoints
    pub general_rps: u32,
    /// Burst size for general endpoints
    pub general_burst: u32,
    /// Requests per second for health endpoints
    pub health_rps: u32,
    /// Burst size for health endpoints
    pub health_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general_rps: 10,
            general_burst: 20,
            health_rps: 100,
            health_burst: 100,
        }
    }
}

/// Shared rate limiter state (keyed by client IP to prevent global DoS)
pub struct RateLimitState {
    general_limiter: governor::RateLimiter<
        IpAddr,
        governor::state::keyed::DashMapStateStore<IpAddr>,
        governor::clock::DefaultClock,
    >,
    health_limiter: governor::RateLimiter<
        IpAddr,
        governor::state::keyed::DashMapStateStore<IpAddr>,
        governor::clock::DefaultClock,
    >,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        let general_quota = Quota::per_second(NonZeroU32::new(config.general_rps).unwrap())
            .allow_burst(NonZeroU32::new(config.general_burst).unwrap());
        let health_quota = Quota::per_second(NonZeroU32::new(config.health_rps).unwrap())
            .allow_burst(NonZeroU32::new(config.health_burst).unwrap());

        Self {
            general_limiter: RateLimiter::dashmap(general_quota),
            health_limiter: RateLimiter::dashmap(health_quota),
            config,
        }
    }
}

/// Extract client IP from request (X-Forwarded-For, X-Real-IP, or ConnectInfo).
/// Falls back to 0.0.0.0 when unknown to avoid blocking; unknown clients share one bucket.
fn client_ip_from_request<B>(request: &Request<B>) -> IpAddr {
    // Prefer proxy headers (client is first in X-Forwarded-For)
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(first) = s.split(',').next() {
                let trimmed = first.trim();
                if let Ok(ip) = trimmed.parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }
    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            if let Ok(ip) = s.trim().parse::<IpAddr>() {
                return ip;
            }
        }
    }
    // ConnectInfo may inject SocketAddr when using into_make_service_with_connect_info
    if let Some(addr) = request.extensions().get::<SocketAddr>() {
        return addr.ip();
    }
    // Fallback: unknown clients share one bucket (prevents total global DoS)
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

/// Rate limit middleware for general endpoints (per-IP to prevent global DoS)
async fn rate_limit_general_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    match rate_limit.general_limiter.check_key(&client_ip) {
        Ok(_) => {
            let mut response = next.run(request).await;
            // Add rate limit headers
            let headers = response.headers_mut();
            headers.insert(
                "X-RateLimit-Limit",
                rate_limit.config.general_rps.to_string().parse().unwrap(),
            );
            response
        }
        Err(not_until) => {
            let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                &governor::clock::DefaultClock::default(),
            ));
            let retry_after = wait_time.as_secs();

            let mut response =
                AppError::operational(429, "Rate limit exceeded. Please slow down your requests.")
                    .into_response();
            let headers = response.headers_mut();
            headers.insert(
                "X-RateLimit-Limit",
                rate_limit.config.general_rps.to_string().parse().unwrap(),
            );
            headers.insert("X-RateLimit-Remaining", "0".parse().unwrap());
            headers.insert("Retry-After", retry_after.to_string().parse().unwrap());
            response
        }
    }
}

/// Rate limit middleware for health endpoints (per-IP to prevent global DoS)
async fn rate_limit_health_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    match rate_limit.health_limiter.check_key(&client_ip) {
        Ok(_) => next.run(request).await,
        Err(not_until) => {
            let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                &governor::clock::DefaultClock::default(),
            ));
            let retry_after = wait_time.as_secs();

            let mut response = AppError::operational(429, "Rate limit exceeded").into_response();
            response
                .headers_mut()
                .insert("Retry-After", retry_after.to_string().parse().unwrap());
            response
        }
    }
}

fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_handler))
        .route("/live", get(liveness_handler))
        .route("/ready", get(readiness_handler))
}

fn upload_routes() -> Router<Arc<AppState>> {
    Router::new().route("/uploads", post(upload_handler))
}

/// Create router without rate limiting
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(CorsLayer::permissive());

    let api_routes = Router::new()
        .nest("/health", health_routes())
        .merge(upload_routes());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .fallback(fallback_handler)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware)
        .with_state(app_state)
}

/// Create router with per-IP rate limiting attached
pub fn create_router_with_rate_limit(app_state: Arc<AppState>, config: RateLimitConfig) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::new(config));

    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(CorsLayer::permissive());

    let api_routes = Router::new()
        .nest(
            "/health",
            health_routes().layer(middleware::from_fn_with_state(
                Arc::clone(&rate_limit_state),
                rate_limit_health_middleware,
            )),
        )
        .merge(upload_routes().layer(middleware::from_fn_with_state(
            Arc::clone(&rate_limit_state),
            rate_limit_general_middleware,
        )));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .fallback(fallback_handler)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware)
        .with_state(app_state)
}
