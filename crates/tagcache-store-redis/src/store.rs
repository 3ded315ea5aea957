//! Redis implementation of the store protocol.

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use redis::{AsyncCommands, RedisError};
use tagcache_store::{KeyValueStore, StoreError};

/// Keys requested per `SCAN` round-trip.
const SCAN_COUNT: usize = 500;

/// Store backed by a pooled Redis connection.
///
/// Each protocol call checks a connection out of the pool, issues exactly one
/// command (or one `SCAN` loop), and returns it. No command is retried.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Wraps an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn conn(&self) -> Result<Connection, StoreError> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to get Redis connection");
            StoreError::unavailable(format!("failed to get Redis connection: {e}"))
        })
    }
}

/// Maps a Redis error onto the store taxonomy.
///
/// Connectivity problems become `Unavailable`; everything else is a command
/// failure.
fn map_redis_error(command: &'static str, e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        StoreError::unavailable(format!("{command}: {e}"))
    } else {
        StoreError::command(command, e.to_string())
    }
}

/// Escapes glob metacharacters so `prefix` matches literally in `SCAN MATCH`.
pub(crate) fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| map_redis_error("GET", e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| map_redis_error("SET", e))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        conn.exists::<_, bool>(key)
            .await
            .map_err(|e| map_redis_error("EXISTS", e))
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        // DEL without arguments is a syntax error
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn().await?;
        conn.del::<_, u64>(keys)
            .await
            .map_err(|e| map_redis_error("DEL", e))
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let added = conn
            .sadd::<_, _, u64>(key, member)
            .await
            .map_err(|e| map_redis_error("SADD", e))?;
        Ok(added > 0)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        conn.smembers::<_, Vec<String>>(key)
            .await
            .map_err(|e| map_redis_error("SMEMBERS", e))
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut conn = self.conn().await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(|e| map_redis_error("SCAN", e))?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once across iterations
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("PING", e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
