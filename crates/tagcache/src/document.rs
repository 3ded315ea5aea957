//! Value documents and their wire encoding.
//!
//! Cached values are JSON documents. Anything `Serialize` can be written;
//! reads hand back a [`Document`], or any `DeserializeOwned` type via
//! [`decode_as`]. Language-specific types are not preserved beyond the JSON
//! model.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CacheError, CacheResult};

/// A cached document: null, bool, number, string, array or string-keyed object.
pub type Document = serde_json::Value;

/// Encode a value into the payload string stored for `fingerprint`.
pub fn encode<T: Serialize + ?Sized>(fingerprint: &str, value: &T) -> CacheResult<String> {
    serde_json::to_string(value).map_err(|source| CacheError::Encoding {
        fingerprint: fingerprint.to_string(),
        source,
    })
}

/// Decode a payload read for `fingerprint` back into a document.
pub fn decode(fingerprint: &str, payload: &str) -> CacheResult<Document> {
    decode_as(fingerprint, payload)
}

/// Decode a payload into a concrete type.
pub fn decode_as<T: DeserializeOwned>(fingerprint: &str, payload: &str) -> CacheResult<T> {
    serde_json::from_str(payload).map_err(|source| CacheError::Decoding {
        fingerprint: fingerprint.to_string(),
        source,
    })
}
