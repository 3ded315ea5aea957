//! # tagcache
//!
//! A result cache for expensive, repeatable lookups (typically database query
//! results) that can be invalidated in bulk by tag.
//!
//! ## Architecture
//!
//! ```text
//! TaggedCache
//!   ├── EntryStore   fingerprint -> encoded document    ({prefix}entry:{fp})
//!   ├── TagIndex     tag -> set of fingerprints          ({prefix}tag:{tag})
//!   └── Invalidator  members(tag) -> delete entries -> clear(tag)
//!            │
//!            ▼
//!      DynStore (tagcache-store: memory, Redis, ...)
//! ```
//!
//! Every operation is a round-trip to the backing store. Nothing is cached
//! in-process and no locks are taken, so any number of tasks or processes may
//! share one store. Multi-step operations are not atomic; a tag may list
//! fingerprints whose entries are gone, which is tolerated everywhere.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagcache::{CacheConfig, CacheKey, TaggedCache};
//! use tagcache_store_memory::InMemoryStore;
//!
//! let cache = TaggedCache::new(Arc::new(InMemoryStore::new()), CacheConfig::default())?;
//! let key = CacheKey::new("q:1").with_tag("orders");
//!
//! if !cache.has(&key).await? {
//!     cache.set(&key, &serde_json::json!({"id": 1, "total": 42})).await?;
//! }
//! let doc = cache.get(&key).await?;
//!
//! cache.invalidate("orders").await?;
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod entry;
pub mod error;
pub mod invalidation;
pub mod keys;
pub mod metrics;
pub mod tags;

pub use cache::TaggedCache;
pub use config::CacheConfig;
pub use document::Document;
pub use entry::EntryStore;
pub use error::{CacheError, CacheResult};
pub use invalidation::{InvalidationReport, Invalidator};
pub use keys::{CacheKey, CacheKeySource, KeyNamespace};
pub use tags::TagIndex;
pub use tagcache_store::{DynStore, KeyValueStore, StoreError};
