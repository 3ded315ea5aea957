use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tagcache_store::{KeyValueStore, StoreError};

/// A stored value: either a plain string or a set of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    Str(String),
    Set(HashSet<String>),
}

impl StoredValue {
    fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Str(_) => "string",
            StoredValue::Set(_) => "set",
        }
    }
}

fn wrong_type(command: &'static str, key: &str, found: &StoredValue) -> StoreError {
    StoreError::command(
        command,
        format!(
            "WRONGTYPE key {key} holds a {} value",
            found.type_name()
        ),
    )
}

/// In-process store backed by a single `DashMap`.
///
/// Strings and sets share one keyspace, so a key holds exactly one kind of
/// value, the same way a Redis key does. `SET` overwrites a key of either
/// kind; reading a set as a string (or the reverse) fails with a `WRONGTYPE`
/// command error. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<DashMap<String, StoredValue>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `key` behind the cache's back.
    ///
    /// Stands in for eviction or expiry done by the store itself. Returns
    /// `true` if the key existed.
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.data.remove(key).is_some();
        if removed {
            tracing::debug!(key = %key, "evicted key");
        }
        removed
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.data.clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.data.get(key) {
            Some(entry) => match entry.value() {
                StoredValue::Str(s) => Ok(Some(s.clone())),
                other => Err(wrong_type("GET", key, other)),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data
            .insert(key.to_string(), StoredValue::Str(value.to_string()));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(key))
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut removed = 0;
        for key in keys {
            if self.data.remove(key.as_str()).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        match self.data.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => match occupied.get_mut() {
                StoredValue::Set(members) => Ok(members.insert(member.to_string())),
                other => Err(wrong_type("SADD", key, other)),
            },
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::Set(HashSet::from([member.to_string()])));
                Ok(true)
            }
        }
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        match self.data.get(key) {
            Some(entry) => match entry.value() {
                StoredValue::Set(members) => Ok(members.iter().cloned().collect()),
                other => Err(wrong_type("SMEMBERS", key, other)),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
