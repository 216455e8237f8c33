/*
 * ©AngelaMos | 2025
 */

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Status of a single downstream dependency.
#[derive(Debug, Serialize)]
pub struct DependencyStatus {
    pub healthy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub services: HealthServices,
}

#[derive(Debug, Serialize)]
pub struct HealthServices {
    pub database: DependencyStatus,
    pub cache: DependencyStatus,
}

/// `GET /api/v1/health`. 200 when both the Content Store and the Result Cache are reachable,
/// 503 otherwise. Never echoes internal error detail beyond a short message.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheckResponse>) {
    let database = match sqlx::query("SELECT 1").execute(state.content_store.pool()).await {
        Ok(_) => DependencyStatus { healthy: true, error: None },
        Err(e) => DependencyStatus { healthy: false, error: Some(e.to_string()) },
    };

    let cache = match state.cache_service.health_check().await {
        Ok(_) => DependencyStatus { healthy: true, error: None },
        Err(e) => DependencyStatus { healthy: false, error: Some(e.to_string()) },
    };

    let all_healthy = database.healthy && cache.healthy;
    let status_code = if all_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let body = HealthCheckResponse {
        status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: HealthServices { database, cache },
    };

    (status_code, Json(body))
}

/// `GET /health/live`. Process-liveness only — never touches a downstream dependency, so an
/// orchestrator can distinguish "the process is wedged" from "a dependency is down".
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// `GET /health/ready`. Same dependency check as `health_check`, with a bare status code body —
/// intended for a load balancer/orchestrator readiness probe rather than human inspection.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    let database_ok = sqlx::query("SELECT 1").execute(state.content_store.pool()).await.is_ok();
    let cache_ok = state.cache_service.health_check().await.is_ok();

    if database_ok && cache_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
