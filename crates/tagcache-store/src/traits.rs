//! The store protocol consumed by the cache core.

use async_trait::async_trait;

use crate::error::StoreError;

/// Key-value and set primitives the cache needs from its backing store.
///
/// The protocol is deliberately narrow: string GET/SET/EXISTS, variadic
/// delete, set-add and set-members, plus prefix enumeration for flushing a
/// namespace. No transactions or scripting are required. Implementations must
/// be thread-safe (`Send + Sync`); each call is one independent operation
/// against the store.
///
/// # Example
///
/// ```ignore
/// use tagcache_store::{KeyValueStore, StoreError};
///
/// async fn tag(store: &dyn KeyValueStore, tag: &str, key: &str) -> Result<(), StoreError> {
///     store.set_add(tag, key).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    // ==================== Strings ====================

    /// Reads the string stored under `key`.
    ///
    /// Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns whether `key` exists. Must not modify the store.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Deletes every key in `keys`, of any type.
    ///
    /// Returns the number of keys that existed. Absent keys are ignored.
    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError>;

    // ==================== Sets ====================

    /// Adds `member` to the set stored under `key`, creating it if needed.
    ///
    /// Returns `true` if the member was not already present.
    async fn set_add(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Returns all members of the set stored under `key`.
    ///
    /// A missing key is an empty set. Order is unspecified.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    // ==================== Keyspace ====================

    /// Lists every key (string or set) that starts with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
