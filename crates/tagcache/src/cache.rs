//! The tagged cache facade.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tagcache_store::DynStore;

use crate::config::CacheConfig;
use crate::document::Document;
use crate::entry::EntryStore;
use crate::error::{CacheError, CacheResult};
use crate::invalidation::{InvalidationReport, Invalidator};
use crate::keys::CacheKeySource;
use crate::tags::TagIndex;

/// Entry store, tag index and invalidator over one backing store.
///
/// Holds no state of its own beyond configuration; clones share the store.
///
/// ## Example
///
/// ```ignore
/// let cache = TaggedCache::new(store, CacheConfig::default())?;
/// let key = CacheKey::new("q:1").with_tag("orders");
///
/// let rows: Vec<Order> = cache
///     .remember(&key, || async { load_orders(&db).await })
///     .await?;
///
/// // after the orders table changes
/// cache.invalidate("orders").await?;
/// ```
#[derive(Clone)]
pub struct TaggedCache {
    entries: EntryStore,
    invalidator: Invalidator,
    config: CacheConfig,
}

impl TaggedCache {
    /// Build a cache from validated configuration.
    ///
    /// Rejects a configuration that fails [`CacheConfig::validate`], so every
    /// cache owns a non-empty key namespace.
    pub fn new(store: DynStore, config: CacheConfig) -> CacheResult<Self> {
        let entries = EntryStore::new(store, &config)?;
        tracing::info!(
            backend = entries.store().backend_name(),
            prefix = %config.prefix,
            active = config.active,
            "tagged cache ready"
        );
        let invalidator = Invalidator::new(entries.clone());
        Ok(Self {
            entries,
            invalidator,
            config,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.config.active
    }

    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub fn tags(&self) -> &TagIndex {
        self.entries.tag_index()
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// Whether a result is cached for `key`. Always `false` when inactive.
    pub async fn has<K: CacheKeySource + ?Sized>(&self, key: &K) -> CacheResult<bool> {
        self.entries.exists(&key.cache_key().fingerprint).await
    }

    /// The cached document for `key`, if any.
    pub async fn get<K: CacheKeySource + ?Sized>(&self, key: &K) -> CacheResult<Option<Document>> {
        self.entries.read(&key.cache_key().fingerprint).await
    }

    /// Cache `value` for `key` under the key's tags.
    pub async fn set<K, T>(&self, key: &K, value: &T) -> CacheResult<()>
    where
        K: CacheKeySource + ?Sized,
        T: Serialize + ?Sized,
    {
        let key = key.cache_key();
        self.entries
            .write(&key.fingerprint, key.tags.as_slice(), value)
            .await
    }

    /// Return the cached value for `key`, computing and caching it on a miss.
    ///
    /// When the cache is inactive `compute` always runs and nothing is written.
    pub async fn remember<K, T, F, Fut>(&self, key: &K, compute: F) -> CacheResult<T>
    where
        K: CacheKeySource + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.try_remember(key, move || async move { Ok::<T, CacheError>(compute().await) })
            .await
    }

    /// Fallible variant of [`remember`](Self::remember).
    ///
    /// Errors from `compute` are returned as-is and nothing is cached.
    pub async fn try_remember<K, T, E, F, Fut>(&self, key: &K, compute: F) -> Result<T, E>
    where
        K: CacheKeySource + ?Sized,
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.is_active() {
            return compute().await;
        }

        let key = key.cache_key();
        let cached = self.lookup::<T>(&key.fingerprint).await.inspect_err(|e| {
            tracing::warn!(fingerprint = %key.fingerprint, error = %e, "cache lookup failed");
        })?;
        if let Some(value) = cached {
            crate::metrics::record_cache_hit();
            tracing::debug!(fingerprint = %key.fingerprint, "cache hit");
            return Ok(value);
        }

        crate::metrics::record_cache_miss();
        tracing::debug!(fingerprint = %key.fingerprint, "cache miss");
        let value = compute().await?;
        self.entries
            .write(&key.fingerprint, key.tags.as_slice(), &value)
            .await
            .inspect_err(|e| {
                tracing::warn!(fingerprint = %key.fingerprint, error = %e, "cache write failed");
            })?;
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, fingerprint: &str) -> CacheResult<Option<T>> {
        if !self.entries.exists(fingerprint).await? {
            return Ok(None);
        }
        // the entry can vanish between the two calls; that reads as a miss
        self.entries.read_as(fingerprint).await
    }

    /// See [`Invalidator::invalidate`].
    pub async fn invalidate(&self, tag: &str) -> CacheResult<InvalidationReport> {
        self.invalidator.invalidate(tag).await
    }

    /// See [`Invalidator::invalidate_many`].
    pub async fn invalidate_many<I, S>(&self, tags: I) -> CacheResult<Vec<InvalidationReport>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.invalidator.invalidate_many(tags).await
    }

    /// See [`Invalidator::flush`].
    pub async fn flush(&self) -> CacheResult<u64> {
        self.invalidator.flush().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use tagcache_store_memory::InMemoryStore;

    use super::*;
    use crate::keys::CacheKey;

    fn cache(config: CacheConfig) -> TaggedCache {
        TaggedCache::new(Arc::new(InMemoryStore::new()), config).unwrap()
    }

    #[tokio::test]
    async fn set_get_has() {
        let cache = cache(CacheConfig::default());
        let key = CacheKey::new("q:1").with_tag("orders");

        assert!(!cache.has(&key).await.unwrap());
        cache.set(&key, &json!({"id": 1})).await.unwrap();
        assert!(cache.has(&key).await.unwrap());
        assert_eq!(cache.get(&key).await.unwrap(), Some(json!({"id": 1})));
        assert!(cache.tags().members("orders").await.unwrap().contains("q:1"));
    }

    #[tokio::test]
    async fn remember_computes_once() {
        let cache = cache(CacheConfig::default());
        let key = CacheKey::new("q:count").with_tag("orders");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Vec<u32> = cache
                .remember(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    vec![1, 2, 3]
                })
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("orders").await.unwrap();
        let _: Vec<u32> = cache
            .remember(&key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![1, 2, 3]
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remember_when_inactive_always_computes_and_never_writes() {
        let backend = InMemoryStore::new();
        let cache = TaggedCache::new(Arc::new(backend.clone()), CacheConfig::inactive()).unwrap();
        let key = CacheKey::new("q:1").with_tag("orders");
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: u32 = cache
                .remember(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn try_remember_does_not_cache_failures() {
        #[derive(Debug)]
        enum AppError {
            Db,
            Cache,
        }
        impl From<CacheError> for AppError {
            fn from(_: CacheError) -> Self {
                AppError::Cache
            }
        }

        let cache = cache(CacheConfig::default());
        let key = CacheKey::new("q:1").with_tag("orders");

        let result: Result<u32, AppError> = cache
            .try_remember(&key, || async { Err(AppError::Db) })
            .await;
        assert!(matches!(result, Err(AppError::Db)));
        assert!(!cache.has(&key).await.unwrap());

        let result: Result<u32, AppError> = cache.try_remember(&key, || async { Ok(5) }).await;
        assert_eq!(result.unwrap(), 5);
        assert!(cache.has(&key).await.unwrap());
    }

    #[test]
    fn new_validates_config() {
        let store = Arc::new(InMemoryStore::new());
        let err = TaggedCache::new(store, CacheConfig::default().with_prefix(""))
            .err()
            .unwrap();
        assert!(matches!(err, CacheError::Config { .. }));
    }
}
