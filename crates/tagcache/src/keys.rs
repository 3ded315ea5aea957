//! Cache keys and the store key namespace.
//!
//! ## Store Key Format
//!
//! - entry: `{prefix}entry:{fingerprint}`
//! - tag set: `{prefix}tag:{tag}`
//!
//! Tag sets hold bare fingerprints, never prefixed store keys.

use std::sync::Arc;

const ENTRY_SEGMENT: &str = "entry:";
const TAG_SEGMENT: &str = "tag:";

/// Maps fingerprints and tags onto store keys under one prefix.
#[derive(Debug, Clone)]
pub struct KeyNamespace {
    prefix: Arc<str>,
}

impl KeyNamespace {
    /// Namespace rooted at `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: Arc::from(prefix),
        }
    }

    /// The raw prefix, as configured.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Store key holding the payload for `fingerprint`.
    #[inline]
    pub fn entry_key(&self, fingerprint: &str) -> String {
        format!("{}{ENTRY_SEGMENT}{fingerprint}", self.prefix)
    }

    /// Store key holding the membership set of `tag`.
    #[inline]
    pub fn tag_key(&self, tag: &str) -> String {
        format!("{}{TAG_SEGMENT}{tag}", self.prefix)
    }

    /// Prefix shared by every entry key.
    pub fn entry_key_prefix(&self) -> String {
        format!("{}{ENTRY_SEGMENT}", self.prefix)
    }

    /// Prefix shared by every tag set key.
    pub fn tag_key_prefix(&self) -> String {
        format!("{}{TAG_SEGMENT}", self.prefix)
    }

    /// Recover the tag name from a tag set key.
    pub fn tag_from_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(&*self.prefix)?.strip_prefix(TAG_SEGMENT)
    }
}

/// Fingerprint plus the tags a cached result depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Opaque, deterministic identity of the request.
    pub fingerprint: String,
    /// Tags the cached result is invalidated by.
    pub tags: Vec<String>,
}

impl CacheKey {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Produces the cache key for a cacheable request.
///
/// Implementations must be deterministic: the same logical request always
/// yields the same fingerprint, and every request depending on a resource
/// declares that resource's tag.
pub trait CacheKeySource {
    fn cache_key(&self) -> CacheKey;
}

impl CacheKeySource for CacheKey {
    fn cache_key(&self) -> CacheKey {
        self.clone()
    }
}
