//! In-memory store backend for tagcache.
//!
//! This crate provides an in-process implementation of the `KeyValueStore`
//! trait from `tagcache-store`, using a `DashMap` for concurrent access. It
//! suits single-process deployments and tests.
//!
//! # Example
//!
//! ```ignore
//! use tagcache_store::KeyValueStore;
//! use tagcache_store_memory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! store.set("greeting", "hello").await?;
//! store.set_add("tag:greetings", "greeting").await?;
//! ```

mod store;

pub use store::InMemoryStore;
pub use tagcache_store::{KeyValueStore, StoreError};

/// Creates a new in-memory store behind the shareable trait object.
pub fn create_memory_store() -> tagcache_store::DynStore {
    std::sync::Arc::new(InMemoryStore::new())
}
