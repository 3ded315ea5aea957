//! Entry store: fingerprint to encoded payload.

use std::collections::BTreeSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tagcache_store::DynStore;

use crate::config::CacheConfig;
use crate::document::{self, Document};
use crate::error::{CacheError, CacheResult};
use crate::keys::KeyNamespace;
use crate::tags::TagIndex;

/// Maps fingerprints to encoded documents and registers them with the tag index.
///
/// Writes are two-step (entry, then one set-add per tag) and not atomic: a
/// failure after the entry is stored leaves it reachable under only some of
/// its tags. Readers never rely on the two being in step.
#[derive(Clone)]
pub struct EntryStore {
    store: DynStore,
    keys: KeyNamespace,
    tags: TagIndex,
    active: bool,
    delete_batch_size: usize,
}

impl EntryStore {
    /// Fails with `CacheError::Config` if `config` does not validate.
    pub fn new(store: DynStore, config: &CacheConfig) -> CacheResult<Self> {
        config.validate().map_err(CacheError::config)?;
        let keys = KeyNamespace::new(&config.prefix);
        Ok(Self {
            tags: TagIndex::new(store.clone(), keys.clone()),
            store,
            keys,
            active: config.active,
            delete_batch_size: config.delete_batch_size,
        })
    }

    /// The tag index this store registers memberships with.
    pub fn tag_index(&self) -> &TagIndex {
        &self.tags
    }

    pub fn namespace(&self) -> &KeyNamespace {
        &self.keys
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether an entry is stored for `fingerprint`.
    ///
    /// Always `false` when the cache is inactive, so a disabled cache is
    /// indistinguishable from an empty one.
    pub async fn exists(&self, fingerprint: &str) -> CacheResult<bool> {
        if !self.active {
            return Ok(false);
        }
        Ok(self.store.exists(&self.keys.entry_key(fingerprint)).await?)
    }

    /// Store `value` under `fingerprint` and register it under every tag.
    ///
    /// Overwrites unconditionally; callers check [`exists`](Self::exists)
    /// first to avoid redundant work. If `value` cannot be encoded nothing
    /// is written.
    pub async fn write<T, S>(&self, fingerprint: &str, tags: &[S], value: &T) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let payload = document::encode(fingerprint, value)?;
        self.store
            .set(&self.keys.entry_key(fingerprint), &payload)
            .await?;

        let unique: BTreeSet<&str> = tags.iter().map(|tag| tag.as_ref()).collect();
        for tag in &unique {
            self.tags.add_member(tag, fingerprint).await?;
        }

        crate::metrics::record_cache_write();
        tracing::debug!(
            fingerprint = %fingerprint,
            tags = unique.len(),
            bytes = payload.len(),
            "cache entry written"
        );
        Ok(())
    }

    /// Decode the entry stored for `fingerprint`.
    ///
    /// `Ok(None)` if nothing is stored; `CacheError::Decoding` if the payload
    /// is present but corrupt.
    pub async fn read(&self, fingerprint: &str) -> CacheResult<Option<Document>> {
        self.read_as(fingerprint).await
    }

    /// Typed variant of [`read`](Self::read).
    pub async fn read_as<T: DeserializeOwned>(&self, fingerprint: &str) -> CacheResult<Option<T>> {
        match self.store.get(&self.keys.entry_key(fingerprint)).await? {
            Some(payload) => Ok(Some(document::decode_as(fingerprint, &payload)?)),
            None => {
                tracing::debug!(fingerprint = %fingerprint, "read of absent cache entry");
                Ok(None)
            }
        }
    }

    /// Remove the entries for `fingerprints`, returning how many existed.
    ///
    /// Absent entries are skipped silently.
    pub async fn delete<S: AsRef<str>>(&self, fingerprints: &[S]) -> CacheResult<u64> {
        let keys: Vec<String> = fingerprints
            .iter()
            .map(|fp| self.keys.entry_key(fp.as_ref()))
            .collect();
        self.delete_keys(&keys).await
    }

    /// Delete raw store keys in batches.
    pub(crate) async fn delete_keys(&self, keys: &[String]) -> CacheResult<u64> {
        let mut removed = 0;
        for chunk in keys.chunks(self.delete_batch_size) {
            removed += self.store.delete(chunk).await?;
        }
        Ok(removed)
    }

    pub(crate) fn store(&self) -> &DynStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tagcache_store::KeyValueStore;
    use tagcache_store_memory::InMemoryStore;

    use super::*;

    fn entries(config: CacheConfig) -> (EntryStore, InMemoryStore) {
        let backend = InMemoryStore::new();
        (
            EntryStore::new(Arc::new(backend.clone()), &config).unwrap(),
            backend,
        )
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (entries, _) = entries(CacheConfig::default());
        let value = json!([{"id": 1, "total": 42.5, "paid": false, "note": null}]);

        assert!(!entries.exists("q:1").await.unwrap());
        entries.write("q:1", &["orders"], &value).await.unwrap();
        assert!(entries.exists("q:1").await.unwrap());
        assert_eq!(entries.read("q:1").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn write_overwrites_previous_value() {
        let (entries, _) = entries(CacheConfig::default());
        entries.write("q:1", &["orders"], &json!(1)).await.unwrap();
        entries.write("q:1", &["orders"], &json!(2)).await.unwrap();
        assert_eq!(entries.read("q:1").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn write_registers_every_tag_once() {
        let (entries, _) = entries(CacheConfig::default());
        entries
            .write("q:1", &["orders", "customers", "orders"], &json!({}))
            .await
            .unwrap();

        let tags = entries.tag_index();
        assert!(tags.members("orders").await.unwrap().contains("q:1"));
        assert!(tags.members("customers").await.unwrap().contains("q:1"));
        assert_eq!(tags.members("orders").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn write_without_tags_is_untagged() {
        let (entries, _) = entries(CacheConfig::default());
        entries
            .write::<_, &str>("q:plain", &[], &json!("x"))
            .await
            .unwrap();
        assert!(entries.exists("q:plain").await.unwrap());
        assert!(entries.tag_index().tags().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_cache_never_reports_existence() {
        let backend = InMemoryStore::new();
        let store: DynStore = Arc::new(backend);
        let active = EntryStore::new(store.clone(), &CacheConfig::default()).unwrap();
        let inactive = EntryStore::new(store, &CacheConfig::inactive()).unwrap();

        active.write("q:1", &["orders"], &json!(1)).await.unwrap();
        assert!(active.exists("q:1").await.unwrap());
        assert!(!inactive.exists("q:1").await.unwrap());
        assert!(!inactive.exists("q:missing").await.unwrap());
    }

    #[tokio::test]
    async fn read_of_absent_entry_is_none() {
        let (entries, _) = entries(CacheConfig::default());
        assert_eq!(entries.read("q:nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_payload_surfaces_as_decoding_error() {
        let (entries, backend) = entries(CacheConfig::default());
        backend
            .set(&entries.namespace().entry_key("q:1"), "{truncated")
            .await
            .unwrap();

        let err = entries.read("q:1").await.unwrap_err();
        assert!(matches!(err, CacheError::Decoding { ref fingerprint, .. } if fingerprint == "q:1"));
    }

    #[tokio::test]
    async fn encoding_failure_writes_nothing() {
        let (entries, backend) = entries(CacheConfig::default());
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], "not a string key");

        let err = entries.write("q:bad", &["orders"], &bad).await.unwrap_err();
        assert!(matches!(err, CacheError::Encoding { .. }));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn delete_skips_absent_entries_and_batches() {
        let config = CacheConfig {
            delete_batch_size: 2,
            ..CacheConfig::default()
        };
        let (entries, _) = entries(config);
        for i in 0..5 {
            entries
                .write(&format!("q:{i}"), &["orders"], &json!(i))
                .await
                .unwrap();
        }

        let removed = entries
            .delete(&["q:0", "q:1", "q:2", "q:3", "q:4", "q:gone"])
            .await
            .unwrap();
        assert_eq!(removed, 5);
        assert!(!entries.exists("q:3").await.unwrap());
    }

    #[tokio::test]
    async fn typed_read() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Order {
            id: u32,
            total: u32,
        }
        let (entries, _) = entries(CacheConfig::default());
        let order = Order { id: 1, total: 42 };
        entries.write("q:1", &["orders"], &order).await.unwrap();
        assert_eq!(entries.read_as::<Order>("q:1").await.unwrap(), Some(order));
    }
}
