//! Cache metrics.
//!
//! Emitted through the `metrics` facade; installing a recorder/exporter is
//! left to the application.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const CACHE_HITS_TOTAL: &str = "tagcache_hits_total";
    pub const CACHE_MISSES_TOTAL: &str = "tagcache_misses_total";
    pub const CACHE_WRITES_TOTAL: &str = "tagcache_writes_total";
    pub const INVALIDATED_ENTRIES_TOTAL: &str = "tagcache_invalidated_entries_total";
    pub const STALE_REFERENCES_TOTAL: &str = "tagcache_stale_references_total";
}

/// Record a cache hit.
pub fn record_cache_hit() {
    counter!(names::CACHE_HITS_TOTAL).increment(1);
}

/// Record a cache miss.
pub fn record_cache_miss() {
    counter!(names::CACHE_MISSES_TOTAL).increment(1);
}

/// Record an entry write.
pub fn record_cache_write() {
    counter!(names::CACHE_WRITES_TOTAL).increment(1);
}

/// Record entries removed by invalidating `tag`, and any stale references found.
pub fn record_invalidation(tag: &str, removed: u64, stale: u64) {
    counter!(names::INVALIDATED_ENTRIES_TOTAL, "tag" => tag.to_string()).increment(removed);
    if stale > 0 {
        counter!(names::STALE_REFERENCES_TOTAL).increment(stale);
    }
}
