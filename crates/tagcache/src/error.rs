//! Cache error types.

use tagcache_store::StoreError;

/// Errors returned by cache operations.
///
/// An absent entry is not an error (reads return `Ok(None)`), and neither is
/// a tag that still lists an entry the store no longer holds.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The value handed to a write could not be serialized. Nothing was written.
    #[error("Failed to encode value for {fingerprint}: {source}")]
    Encoding {
        /// Fingerprint the value was going to be stored under.
        fingerprint: String,
        /// The serializer's error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored payload exists but is not a valid encoded document.
    #[error("Corrupt payload for {fingerprint}: {source}")]
    Decoding {
        /// Fingerprint whose payload failed to decode.
        fingerprint: String,
        /// The deserializer's error.
        #[source]
        source: serde_json::Error,
    },

    /// The backing store failed. Propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl CacheError {
    /// Creates a new `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if the backing store could not be reached.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_unavailable())
    }
}

/// Type alias for a cache result.
pub type CacheResult<T> = Result<T, CacheError>;
