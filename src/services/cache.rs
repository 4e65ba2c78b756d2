use crate::models::{Item, OrderHint};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result of looking up a catalog snapshot
#[derive(Debug)]
pub enum CatalogLookup {
    Hit(Vec<Item>),
    /// Nothing cached for the current generation; pass it back to
    /// [`CacheManager::set_catalog`] after reading the store.
    Miss { generation: u64 },
}

/// Two-tier cache for catalog snapshots
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Snapshots are keyed by a catalog generation held in Redis. Invalidation
/// bumps the generation, so every instance stops serving older snapshots on
/// its next lookup, whatever its L1 still holds.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    async fn generation(&self, conn: &mut ConnectionManager) -> Result<u64, CacheError> {
        let value: Option<u64> = redis::cmd("GET")
            .arg(CacheKey::generation())
            .query_async(conn)
            .await?;
        Ok(value.unwrap_or(0))
    }

    /// Look up the snapshot for the current catalog generation (L1, then L2)
    pub async fn get_catalog(&self, order: OrderHint) -> Result<CatalogLookup, CacheError> {
        let mut conn = self.redis.lock().await;
        let generation = self.generation(&mut conn).await?;
        let key = CacheKey::catalog(order, generation);

        if let Some(bytes) = self.l1_cache.get(&key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(CatalogLookup::Hit(serde_json::from_slice(&bytes)?));
        }

        let value: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);
            let items = serde_json::from_str(&json)?;
            self.l1_cache.insert(key, json.into_bytes()).await;
            return Ok(CatalogLookup::Hit(items));
        }

        tracing::trace!("Cache miss: {}", key);
        Ok(CatalogLookup::Miss { generation })
    }

    /// Store a snapshot read under `generation`
    ///
    /// Returns `false` without writing when the catalog was invalidated since
    /// that generation was observed.
    pub async fn set_catalog(
        &self,
        order: OrderHint,
        generation: u64,
        items: &[Item],
    ) -> Result<bool, CacheError> {
        let json = serde_json::to_string(items)?;
        let key = CacheKey::catalog(order, generation);

        let mut conn = self.redis.lock().await;
        if self.generation(&mut conn).await? != generation {
            tracing::debug!("Catalog changed while loading, not caching {}", key);
            return Ok(false);
        }

        let _: () = redis::cmd("SETEX")
            .arg(&key)
            .arg(self.ttl_secs)
            .arg(&json)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        self.l1_cache.insert(key.clone(), json.into_bytes()).await;

        tracing::trace!("Cache set: {}", key);
        Ok(true)
    }

    /// Retire every cached catalog snapshot, returning the new generation
    pub async fn invalidate_catalog(&self) -> Result<u64, CacheError> {
        let mut conn = self.redis.lock().await;
        let generation: u64 = redis::cmd("INCR")
            .arg(CacheKey::generation())
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        self.l1_cache.invalidate_all();

        tracing::debug!("Catalog cache generation now {}", generation);
        Ok(generation)
    }

    /// Number of entries held in L1
    pub fn l1_entries(&self) -> u64 {
        self.l1_cache.entry_count()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a catalog snapshot in the given order
    pub fn catalog(order: OrderHint, generation: u64) -> String {
        format!("catalog:{}:g{}", order.as_str(), generation)
    }

    pub fn generation() -> &'static str {
        "catalog:generation"
    }
}
