#![allow(dead_code)]

use std::sync::Arc;

use tagcache::{CacheConfig, TaggedCache};
use tagcache_store_memory::InMemoryStore;
use tracing_subscriber::EnvFilter;

/// Route test logs through `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A cache over a fresh in-memory store, plus a handle to that store.
pub fn memory_cache(config: CacheConfig) -> (TaggedCache, InMemoryStore) {
    init_tracing();
    let backend = InMemoryStore::new();
    let cache = TaggedCache::new(Arc::new(backend.clone()), config).expect("valid config");
    (cache, backend)
}
