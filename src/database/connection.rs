/*
 * Database connection pool management with optimized settings, health monitoring, and automatic recovery.
 * I'm implementing robust PostgreSQL connection handling with performance optimization and comprehensive error recovery mechanisms.
 */

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

use crate::utils::config::DatabasePoolConfig;
use crate::utils::error::{AppError, Result};

pub type DatabasePool = PgPool;

/// Create a connection pool using conservative defaults.
pub async fn create_pool(database_url: &str) -> Result<DatabasePool> {
    create_pool_with_config(
        database_url,
        &DatabasePoolConfig {
            max_connections: 20,
            min_connections: 2,
            connect_timeout_seconds: 10,
        },
    )
    .await
}

/// Create a connection pool with explicit tuning, used at startup from `Config::database_pool_config()`.
pub async fn create_pool_with_config(database_url: &str, config: &DatabasePoolConfig) -> Result<DatabasePool> {
    let mut connect_options = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::ConfigurationError(format!("invalid DATABASE_URL: {}", e)))?
        .application_name("content-search-service")
        .ssl_mode(PgSslMode::Prefer)
        .statement_cache_capacity(100);
    connect_options = connect_options.log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("failed to create connection pool: {}", e)))?;

    info!(
        "database pool ready: max_connections={} min_connections={}",
        config.max_connections, config.min_connections
    );

    Ok(pool)
}

/// Run a closure inside a transaction, committing on success and rolling back on error.
pub async fn with_transaction<F, R>(pool: &DatabasePool, f: F) -> Result<R>
where
    F: for<'c> FnOnce(
        &mut sqlx::Transaction<'c, sqlx::Postgres>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<R>> + Send + 'c>>,
{
    let mut tx = pool.begin().await?;
    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("failed to rollback transaction: {}", rollback_err);
            }
            Err(e)
        }
    }
}
