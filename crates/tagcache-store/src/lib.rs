//! # tagcache-store
//!
//! Store protocol for the tagcache result cache.
//!
//! This crate defines the trait every backing store must implement and the
//! errors it may return. It does not contain any implementations; those are
//! provided by `tagcache-store-memory` and `tagcache-store-redis`.
//!
//! ## Implementing a backend
//!
//! ```ignore
//! use async_trait::async_trait;
//! use tagcache_store::{KeyValueStore, StoreError};
//!
//! struct MyStore {
//!     // ...
//! }
//!
//! #[async_trait]
//! impl KeyValueStore for MyStore {
//!     async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
//!         // Implementation
//!     }
//!     // ... other methods
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StoreError};
pub use traits::KeyValueStore;

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a shareable store trait object.
pub type DynStore = std::sync::Arc<dyn KeyValueStore>;
