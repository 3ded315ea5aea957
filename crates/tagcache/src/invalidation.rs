//! Tag invalidation.
//!
//! ## Algorithm
//!
//! 1. Read the tag's membership set
//! 2. Delete every listed entry (already-absent entries are no-ops)
//! 3. Clear the tag's set
//!
//! Deletes happen before the clear: a crash in between leaves harmless
//! stale members, never entries nobody can find. Cost is proportional to the
//! number of tagged entries, not the size of the cache.
//!
//! ## Accepted Race
//!
//! ```text
//! invalidate("orders")          write("q:9", ["orders"])
//!   members -> {q:1}
//!                                 SET entry:q:9, SADD tag:orders q:9
//!   DEL entry:q:1
//!   DEL tag:orders              (q:9 stays cached, no longer tagged)
//! ```
//!
//! No locking is applied; callers that cannot tolerate this must serialize
//! writes and invalidations themselves.

use std::collections::BTreeSet;

use crate::entry::EntryStore;
use crate::error::CacheResult;
use crate::tags::TagIndex;

/// Outcome of invalidating one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationReport {
    pub tag: String,
    /// Fingerprints the tag listed when it was read.
    pub fingerprints: BTreeSet<String>,
    /// How many of those still had an entry and were removed.
    pub removed: u64,
}

impl InvalidationReport {
    /// Members whose entries were already gone.
    pub fn stale(&self) -> u64 {
        (self.fingerprints.len() as u64).saturating_sub(self.removed)
    }
}

/// Removes tagged entries and resets their tags.
#[derive(Clone)]
pub struct Invalidator {
    entries: EntryStore,
    tags: TagIndex,
}

impl Invalidator {
    pub fn new(entries: EntryStore) -> Self {
        let tags = entries.tag_index().clone();
        Self { entries, tags }
    }

    /// Remove every entry tagged with `tag`, then reset the tag.
    pub async fn invalidate(&self, tag: &str) -> CacheResult<InvalidationReport> {
        let fingerprints = self.tags.members(tag).await?;
        let listed: Vec<&str> = fingerprints.iter().map(String::as_str).collect();
        let removed = self.entries.delete(&listed).await?;
        self.tags.clear(tag).await?;

        let report = InvalidationReport {
            tag: tag.to_string(),
            fingerprints,
            removed,
        };
        let stale = report.stale();
        if stale > 0 {
            tracing::debug!(tag = %tag, stale, "tag listed entries that were already gone");
        }
        crate::metrics::record_invalidation(tag, removed, stale);
        tracing::info!(tag = %tag, removed, "tag invalidated");
        Ok(report)
    }

    /// Invalidate several tags in turn.
    ///
    /// Duplicate tags are invalidated once. Stops at the first store error;
    /// tags invalidated before it stay invalidated.
    pub async fn invalidate_many<I, S>(&self, tags: I) -> CacheResult<Vec<InvalidationReport>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let mut reports = Vec::new();
        for tag in tags {
            let tag = tag.as_ref();
            if !seen.insert(tag.to_string()) {
                continue;
            }
            reports.push(self.invalidate(tag).await?);
        }
        Ok(reports)
    }

    /// Remove every entry and every tag set owned by this cache.
    ///
    /// Only the namespace's entry and tag key prefixes are scanned, so keys
    /// of other caches sharing the store survive even when their prefix
    /// starts with this one. Returns the number of keys removed.
    pub async fn flush(&self) -> CacheResult<u64> {
        let namespace = self.entries.namespace();
        let mut removed = 0;
        for scope in [namespace.entry_key_prefix(), namespace.tag_key_prefix()] {
            let keys = self.entries.store().keys_with_prefix(&scope).await?;
            removed += self.entries.delete_keys(&keys).await?;
        }
        tracing::info!(prefix = %namespace.prefix(), removed, "cache flushed");
        Ok(removed)
    }
}
