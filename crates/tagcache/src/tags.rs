//! Tag index: per tag, the set of fingerprints depending on it.
//!
//! Nothing here checks the entry store. A set may list fingerprints whose
//! entries are already gone; the invalidation routine tolerates that.

use std::collections::BTreeSet;

use tagcache_store::DynStore;

use crate::error::CacheResult;
use crate::keys::KeyNamespace;

/// Tag membership sets in the store, one per tag.
#[derive(Clone)]
pub struct TagIndex {
    store: DynStore,
    keys: KeyNamespace,
}

impl TagIndex {
    pub fn new(store: DynStore, keys: KeyNamespace) -> Self {
        Self { store, keys }
    }

    /// Register `fingerprint` under `tag`.
    ///
    /// Idempotent. Returns `true` if the fingerprint was not yet a member.
    pub async fn add_member(&self, tag: &str, fingerprint: &str) -> CacheResult<bool> {
        let added = self
            .store
            .set_add(&self.keys.tag_key(tag), fingerprint)
            .await?;
        tracing::debug!(tag = %tag, fingerprint = %fingerprint, added, "tag member registered");
        Ok(added)
    }

    /// Current members of `tag`. Empty if the tag has never been used or was cleared.
    pub async fn members(&self, tag: &str) -> CacheResult<BTreeSet<String>> {
        let members = self.store.set_members(&self.keys.tag_key(tag)).await?;
        Ok(members.into_iter().collect())
    }

    /// Drop the whole membership set of `tag`.
    pub async fn clear(&self, tag: &str) -> CacheResult<()> {
        self.store.delete(&[self.keys.tag_key(tag)]).await?;
        tracing::debug!(tag = %tag, "tag cleared");
        Ok(())
    }

    /// Every tag that currently has a membership set, sorted.
    pub async fn tags(&self) -> CacheResult<Vec<String>> {
        let mut tags: Vec<String> = self
            .store
            .keys_with_prefix(&self.keys.tag_key_prefix())
            .await?
            .iter()
            .filter_map(|key| self.keys.tag_from_key(key))
            .map(str::to_string)
            .collect();
        tags.sort_unstable();
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tagcache_store_memory::InMemoryStore;

    use super::*;

    fn index() -> TagIndex {
        TagIndex::new(Arc::new(InMemoryStore::new()), KeyNamespace::new("t:"))
    }

    #[tokio::test]
    async fn add_member_is_idempotent() {
        let index = index();
        assert!(index.add_member("orders", "q:1").await.unwrap());
        assert!(!index.add_member("orders", "q:1").await.unwrap());
        assert!(!index.add_member("orders", "q:1").await.unwrap());

        let members = index.members("orders").await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(members.contains("q:1"));
    }

    #[tokio::test]
    async fn unknown_tag_has_no_members() {
        let index = index();
        assert!(index.members("never-used").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_tag() {
        let index = index();
        index.add_member("orders", "q:1").await.unwrap();
        index.add_member("orders", "q:2").await.unwrap();
        index.clear("orders").await.unwrap();
        assert!(index.members("orders").await.unwrap().is_empty());

        // clearing twice is harmless
        index.clear("orders").await.unwrap();
    }

    #[tokio::test]
    async fn tags_lists_live_sets() {
        let index = index();
        index.add_member("orders", "q:1").await.unwrap();
        index.add_member("customers", "q:1").await.unwrap();
        assert_eq!(index.tags().await.unwrap(), vec!["customers", "orders"]);

        index.clear("orders").await.unwrap();
        assert_eq!(index.tags().await.unwrap(), vec!["customers"]);
    }
}
