/*
 * Routes module aggregator organizing all HTTP endpoints with consistent structure and middleware integration.
 * I'm implementing clean route organization that enables easy expansion while maintaining performance and security standards.
 */

pub mod admin;
pub mod health;
pub mod search;

// Re-export all route handlers for convenient access from main.rs
pub use admin::*;
pub use health::*;
pub use search::*;

use std::net::IpAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderValue, Method, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use tracing::info;

use crate::AppState;

/// Create the complete application router with all endpoints and middleware.
pub fn create_router() -> Router<AppState> {
    info!("creating application router");

    Router::new()
        .route("/api/v1/search", get(search::search))
        .route("/api/v1/admin/sync", post(admin::trigger_sync))
        .route("/api/v1/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .fallback(handle_404)
        .layer(axum::middleware::from_fn(search_rate_limit_middleware))
        .layer(axum::middleware::from_fn(fold_request_id_into_error_body))
        .layer(create_middleware_stack())
}

/// Build the common middleware stack applied to every route.
///
/// Layers included:
/// - CORS
/// - Request-ID (UUID v4 per request, echoed in `X-Request-Id`)
/// - Compression
/// - Timeout
/// - Trace (high-level request/response logging)
/// - Request body size limit
fn create_middleware_stack() -> impl tower::Layer<axum::routing::Route> + Clone {
    use tower::ServiceBuilder;
    use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

    ServiceBuilder::new()
        .layer(create_cors_layer())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1 MiB max body — no large-body endpoints
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
}

/// Reads the UUID v4 stamped by `SetRequestIdLayer` and, for non-2xx responses, folds it into the
/// JSON error envelope's `request_id` field so a client can correlate a failure with server logs
/// without having to separately read the `X-Request-Id` response header.
async fn fold_request_id_into_error_body(request: Request<Body>, next: axum::middleware::Next) -> axum::response::Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    let Some(request_id) = request_id else {
        return response;
    };
    if response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return (parts.status, parts.headers, Body::empty()).into_response(),
    };

    let Ok(mut json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return (parts.status, parts.headers, Body::from(bytes)).into_response();
    };
    if let Some(object) = json.as_object_mut() {
        object.insert("request_id".to_string(), serde_json::Value::String(request_id));
    }

    let patched = serde_json::to_vec(&json).unwrap_or_else(|_| bytes.to_vec());
    (parts.status, parts.headers, Body::from(patched)).into_response()
}

/// Create CORS layer with appropriate configuration for different environments.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            axum::http::header::USER_AGENT,
        ])
        .allow_origin(Any)
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600))
}

const SEARCH_RATE_LIMIT_PER_MINUTE: u32 = 60;
const SEARCH_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

struct ClientWindow {
    count: u32,
    window_started_at: Instant,
}

/// Per-client-IP fixed-window counter, scoped to `/api/v1/search`. I'm keeping this in-process
/// (a `DashMap`, not Redis) since it only needs to survive one process's lifetime and doesn't need
/// to be shared across replicas.
static SEARCH_RATE_LIMITS: Lazy<DashMap<IpAddr, ClientWindow>> = Lazy::new(DashMap::new);

/// Enforces `SEARCH_RATE_LIMIT_PER_MINUTE` requests per client IP per rolling-reset minute on
/// `/api/v1/search`. Every other path passes straight through.
async fn search_rate_limit_middleware(
    ConnectInfo(peer): ConnectInfo<std::net::SocketAddr>,
    request: Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, crate::utils::error::AppError> {
    if request.uri().path() != "/api/v1/search" {
        return Ok(next.run(request).await);
    }

    let ip = client_ip(&request, peer);
    let now = Instant::now();

    let limited = {
        let mut entry = SEARCH_RATE_LIMITS.entry(ip).or_insert_with(|| ClientWindow {
            count: 0,
            window_started_at: now,
        });

        if now.duration_since(entry.window_started_at) >= SEARCH_RATE_LIMIT_WINDOW {
            entry.count = 0;
            entry.window_started_at = now;
        }

        entry.count += 1;
        entry.count > SEARCH_RATE_LIMIT_PER_MINUTE
    };

    if limited {
        tracing::warn!("rate limit exceeded for {} on /api/v1/search", ip);
        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from_static("60"));
        return Ok(response);
    }

    Ok(next.run(request).await)
}

/// Resolve the client IP for rate-limiting purposes: `X-Forwarded-For`'s first entry, then
/// `X-Real-IP`, then the TCP peer address as observed by the listener.
fn client_ip(request: &Request<axum::body::Body>, peer: std::net::SocketAddr) -> IpAddr {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .and_then(|v| v.parse::<IpAddr>().ok())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<IpAddr>().ok())
        })
        .unwrap_or(peer.ip())
}

/// Fallback handler for undefined routes.
pub async fn handle_404() -> axum::response::Response {
    let error_response = serde_json::json!({
        "error": {
            "code": "NOT_FOUND",
            "message": "The requested endpoint does not exist",
            "timestamp": chrono::Utc::now(),
            "available_endpoints": [
                "/api/v1/search",
                "/api/v1/admin/sync",
                "/api/v1/health",
                "/health/live",
                "/health/ready"
            ]
        }
    });

    (axum::http::StatusCode::NOT_FOUND, axum::Json(error_response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_prefers_forwarded_for_first_entry() {
        let request = Request::builder()
            .uri("/api/v1/search")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        let peer: std::net::SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(client_ip(&request, peer), "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_peer() {
        let request = Request::builder()
            .uri("/api/v1/search")
            .header("x-real-ip", "198.51.100.9")
            .body(axum::body::Body::empty())
            .unwrap();
        let peer: std::net::SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(client_ip(&request, peer), "198.51.100.9".parse::<IpAddr>().unwrap());

        let request = Request::builder()
            .uri("/api/v1/search")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, peer), peer.ip());
    }
}
