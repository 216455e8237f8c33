// backend/src/services/cache_service.rs

use redis::{AsyncCommands, Client};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::utils::error::{AppError, Result};

/// The Result Cache (C7): a keyed byte-blob store with TTL, point delete, and prefix-scoped
/// namespace clear, backed by Redis. I'm keeping the teacher's connection-manager recycling
/// pattern (ping, recreate on failure) but dropping the rich `CacheEntry<T>` metadata wrapper —
/// the search-result cache only needs raw bytes in, raw bytes out.
#[derive(Clone)]
pub struct CacheService {
    client: Client,
    key_prefix: String,
    default_ttl: u64,
    connection_pool: Arc<RwLock<Option<redis::aio::ConnectionManager>>>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("key_prefix", &self.key_prefix)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl CacheService {
    pub fn new(client: Client) -> Self {
        Self::with_config(client, "search:".to_string(), 300)
    }

    pub fn with_config(client: Client, key_prefix: String, default_ttl: u64) -> Self {
        Self {
            client,
            key_prefix,
            default_ttl,
            connection_pool: Arc::new(RwLock::new(None)),
        }
    }

    async fn get_connection(&self) -> Result<redis::aio::ConnectionManager> {
        {
            let guard = self.connection_pool.read().await;
            if let Some(conn) = guard.as_ref() {
                let mut probe = conn.clone();
                if redis::cmd("PING").query_async::<_, String>(&mut probe).await.is_ok() {
                    return Ok(conn.clone());
                }
            }
        }

        let mut guard = self.connection_pool.write().await;
        let conn = self.create_connection().await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn create_connection(&self) -> Result<redis::aio::ConnectionManager> {
        self.client
            .get_tokio_connection_manager()
            .await
            .map_err(|e| AppError::CacheError(format!("failed to connect to redis: {}", e)))
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Fetch raw bytes for a key, or `None` if absent/expired.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_connection().await?;
        let full_key = self.build_key(key);
        let value: Option<Vec<u8>> = conn.get(&full_key).await?;
        Ok(value)
    }

    /// Store raw bytes for a key with an explicit TTL.
    pub async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let full_key = self.build_key(key);
        conn.set_ex(&full_key, value, ttl_seconds).await?;
        Ok(())
    }

    /// Store raw bytes using the service's configured default TTL.
    pub async fn set_default(&self, key: &str, value: &[u8]) -> Result<()> {
        self.set(key, value, self.default_ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let full_key = self.build_key(key);
        let removed: i64 = conn.del(&full_key).await?;
        Ok(removed > 0)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let full_key = self.build_key(key);
        let exists: bool = conn.exists(&full_key).await?;
        Ok(exists)
    }

    /// Delete every key under this service's prefix. Used after a sync run clears stale
    /// search results; scoped to the prefix, never a global FLUSHALL.
    pub async fn clear(&self) -> Result<u64> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("{}*", self.key_prefix);
        let keys: Vec<String> = conn.keys(&pattern).await?;

        if keys.is_empty() {
            return Ok(0);
        }

        let removed: u64 = conn.del(&keys).await?;
        debug!("cleared {} keys under prefix {}", removed, self.key_prefix);
        Ok(removed)
    }

    pub async fn health_check(&self) -> Result<serde_json::Value> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::CacheError(format!("redis ping failed: {}", e)))?;

        let probe_key = self.build_key("__health_probe__");
        let roundtrip_ok = conn
            .set_ex::<_, _, ()>(&probe_key, b"ok".to_vec(), 5)
            .await
            .is_ok()
            && conn.del::<_, i64>(&probe_key).await.is_ok();

        if !roundtrip_ok {
            warn!("redis health check roundtrip failed");
        }

        Ok(serde_json::json!({
            "status": if pong == "PONG" && roundtrip_ok { "healthy" } else { "degraded" },
            "ping": pong,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> CacheService {
        let client = Client::open("redis://127.0.0.1:6379").unwrap();
        CacheService::with_config(client, "test:".to_string(), 60)
    }

    #[test]
    fn build_key_applies_prefix() {
        let service = test_service();
        assert_eq!(service.build_key("foo"), "test:foo");
    }

    #[tokio::test]
    #[ignore]
    async fn set_then_get_roundtrips() {
        let service = test_service();
        service.set("roundtrip", b"hello", 60).await.unwrap();
        let value = service.get("roundtrip").await.unwrap();
        assert_eq!(value, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    #[ignore]
    async fn clear_removes_all_prefixed_keys() {
        let service = test_service();
        service.set("a", b"1", 60).await.unwrap();
        service.set("b", b"2", 60).await.unwrap();
        let removed = service.clear().await.unwrap();
        assert!(removed >= 2);
    }
}
