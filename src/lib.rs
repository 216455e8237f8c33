/*
 * Core library module for the federated content search service, organizing all modules and exposing public APIs.
 * I'm setting up a clean module structure with proper error handling, database integration, and service wiring.
 */

// Module declarations - I'm organizing code into logical service layers
pub mod database;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types and utilities for internal use
pub use utils::{
    config::Config,
    error::{AppError, Result},
    metrics::MetricsCollector,
};

// Re-export database utilities
pub use database::connection::{create_pool, DatabasePool};

// Re-export core models for external API usage
pub use models::{
    content::{Content, ContentKind, NormalizedRecord, NormalizedStats, Score, Statistics},
    provider::Provider,
    search::{SearchParams, SearchResponse},
};

// Re-export service layer for application logic
pub use services::{CacheService, ContentStore, ScoringEngine, SearchEngine, SyncOrchestrator};

/// Core application state shared across every handler and background task.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db_pool: DatabasePool,
    pub redis_client: redis::Client,
    pub content_store: ContentStore,
    pub scoring_engine: ScoringEngine,
    pub search_engine: SearchEngine,
    pub sync_orchestrator: SyncOrchestrator,
    pub cache_service: CacheService,
    pub metrics: MetricsCollector,
}

impl AppState {
    /// Creates new application state with all initialized services.
    /// I'm ensuring all dependencies are properly connected and configured before the server starts accepting traffic.
    pub async fn new(config: Config) -> Result<Self> {
        let db_pool = create_pool(&config.database_url).await?;

        let redis_client = redis::Client::open(config.cache_url.clone())
            .map_err(|e| AppError::CacheError(format!("redis connection failed: {}", e)))?;

        let metrics = MetricsCollector::new()?;

        let registry = services::ServiceRegistry::new(db_pool.clone(), redis_client.clone(), &config).await?;

        Ok(AppState {
            config,
            db_pool,
            redis_client,
            content_store: registry.content_store,
            scoring_engine: registry.scoring_engine,
            search_engine: registry.search_engine,
            sync_orchestrator: registry.sync_orchestrator,
            cache_service: registry.cache_service,
            metrics,
        })
    }

    /// Health check that verifies the Content Store and Result Cache are both reachable.
    pub async fn health_check(&self) -> Result<serde_json::Value> {
        let db_status = match sqlx::query("SELECT 1").execute(&self.db_pool).await {
            Ok(_) => "healthy",
            Err(_) => "unhealthy",
        };

        let cache_status = match self.cache_service.health_check().await {
            Ok(_) => "healthy",
            Err(_) => "unhealthy",
        };

        Ok(serde_json::json!({
            "status": if db_status == "healthy" && cache_status == "healthy" { "healthy" } else { "unhealthy" },
            "timestamp": chrono::Utc::now(),
            "services": {
                "database": db_status,
                "cache": cache_status,
            },
            "version": env!("CARGO_PKG_VERSION"),
            "build_time": env!("BUILD_TIME"),
            "git_commit": env!("GIT_COMMIT"),
        }))
    }

    /// Graceful shutdown that cleans up resources and connections.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("initiating graceful shutdown");

        self.metrics.flush().await?;
        self.db_pool.close().await;

        tracing::info!("graceful shutdown completed");
        Ok(())
    }
}

// Helper macros for common operations that I use throughout the application

/// Macro for timing operations and collecting performance metrics.
#[macro_export]
macro_rules! time_operation {
    ($metrics:expr, $operation:expr, $code:block) => {{
        let start = std::time::Instant::now();
        let result = $code;
        let duration = start.elapsed();

        $metrics.record_operation_time($operation, duration.as_millis() as f64).await;

        result
    }};
}

/// Macro for caching expensive operations with automatic TTL.
#[macro_export]
macro_rules! cached_operation {
    ($cache:expr, $key:expr, $ttl:expr, $operation:block) => {{
        match $cache.get($key).await {
            Ok(Some(cached)) => Ok(cached),
            _ => {
                let result = $operation;
                if let Ok(ref value) = result {
                    let _ = $cache.set($key, value, $ttl).await;
                }
                result
            }
        }
    }};
}

// Integration tests module
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a live DATABASE_URL/CACHE_URL"]
    async fn test_app_state_creation() {
        let config = Config::from_env().expect("test configuration should be valid");
        let app_state = AppState::new(config).await;

        assert!(app_state.is_ok(), "app state creation should succeed");
    }

    #[tokio::test]
    #[ignore = "requires a live DATABASE_URL/CACHE_URL"]
    async fn test_health_check() {
        let config = Config::from_env().expect("test configuration should be valid");
        let app_state = AppState::new(config).await.expect("app state should be created");

        let health = app_state.health_check().await;
        assert!(health.is_ok(), "health check should return successfully");

        let health_json = health.unwrap();
        assert!(health_json["status"].is_string(), "health status should be present");
        assert!(health_json["services"].is_object(), "services status should be present");
    }
}

// Export version and build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

// Export common async utilities
pub mod async_utils {
    //! Async utilities and helpers for improved performance and error handling.
    //! I'm providing common patterns for async operations throughout the application.

    use crate::utils::error::{AppError, Result};
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Execute an operation with a hard timeout.
    /// I'm ensuring no operation can hang indefinitely — provider fetches use their own linear
    /// backoff (see `services::providers::retry_linear`) rather than this generic retry helper.
    pub async fn with_timeout<F, T>(operation: F, timeout_duration: Duration) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        timeout(timeout_duration, operation)
            .await
            .map_err(|_| AppError::TimeoutError("operation timed out".to_string()))?
    }
}
