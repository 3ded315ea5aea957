//! Redis store backend for tagcache.
//!
//! Entries are plain Redis strings and tag membership sets are Redis sets,
//! so several processes sharing one Redis see the same cache and the same
//! tag index.
//!
//! ## Command Mapping
//!
//! | Protocol call      | Redis command             |
//! |--------------------|---------------------------|
//! | `get`              | `GET`                     |
//! | `set`              | `SET`                     |
//! | `exists`           | `EXISTS`                  |
//! | `delete`           | `DEL k1 k2 ...`           |
//! | `set_add`          | `SADD`                    |
//! | `set_members`      | `SMEMBERS`                |
//! | `keys_with_prefix` | `SCAN MATCH prefix* COUNT`|
//! | `ping`             | `PING`                    |

mod config;
mod store;

use std::time::Duration;

pub use config::RedisConfig;
pub use store::RedisStore;
pub use tagcache_store::{KeyValueStore, StoreError};

/// Create a Redis store from configuration.
///
/// Builds the connection pool and checks out one connection to verify that
/// Redis is reachable. There is no local fallback: a store the cache cannot
/// reach is reported as `StoreError::Unavailable` and the caller decides what
/// to do about it.
pub async fn create_redis_store(config: &RedisConfig) -> Result<RedisStore, StoreError> {
    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    redis_config.pool = Some(pool_config);

    let pool = redis_config
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to create Redis pool");
            StoreError::unavailable(format!("failed to create Redis pool: {e}"))
        })?;

    let store = RedisStore::new(pool);
    store.ping().await?;
    tracing::info!("Connected to Redis");

    Ok(store)
}
