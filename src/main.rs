/*
 * Application entry point orchestrating startup for the federated content search service.
 * I'm implementing application initialization with service integration, configuration management, and graceful shutdown handling.
 */

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use content_search_service::{
    routes,
    services::sync_orchestrator::run_scheduler,
    utils::{config::Config, error::AppError},
    AppState, Result,
};

/// Prometheus metrics endpoint.
async fn prometheus_metrics(State(state): State<AppState>) -> std::result::Result<String, AppError> {
    state.metrics.get_prometheus_metrics().await
}

fn build_router(app_state: AppState) -> Router {
    let mut router = routes::create_router();
    if app_state.config.metrics_enabled {
        router = router.route("/api/v1/metrics", get(prometheus_metrics));
    }
    router.with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting federated content search service");

    let config = Config::from_env()?;
    config.log_configuration_summary();

    let app_state = AppState::new(config).await?;

    info!("running database migrations");
    sqlx::migrate!("src/database/migrations")
        .run(&app_state.db_pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))?;

    match app_state.health_check().await {
        Ok(health) => info!("initial health check passed: {}", health["status"]),
        Err(e) => warn!("initial health check failed: {}", e),
    }

    let cancel = CancellationToken::new();
    let sync_interval = Duration::from_secs(app_state.config.sync_interval_seconds);
    tokio::spawn(run_scheduler(app_state.sync_orchestrator.clone(), sync_interval, cancel.clone()));

    let addr = app_state.config.socket_addr()?;
    let metrics_enabled = app_state.config.metrics_enabled;
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::ConfigurationError(format!("failed to bind to address {}: {}", addr, e)))?;

    info!("content search service listening on {}", addr);
    if metrics_enabled {
        info!("metrics available at http://{}/api/v1/metrics", addr);
    }
    info!("health check available at http://{}/api/v1/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancel))
    .await
    .map_err(|e| AppError::InternalServerError(format!("server error: {}", e)))?;

    info!("server shutting down gracefully");
    Ok(())
}

/// Handle graceful shutdown signals, cancelling the background sync scheduler along with the
/// server so a ctrl-c doesn't leave a sync pass running against a pool that's about to close.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, starting graceful shutdown");
    cancel.cancel();
}
