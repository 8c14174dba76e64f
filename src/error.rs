//! Error types for the cache containers
//!
//! Normal lookups report absence with `None`. These errors back the strict
//! accessors that callers opt into when a missing key is a bug on their side.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache containers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not present in the cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A view tried to admit a key its backing store does not hold
    #[error("Key not in backing store: {0}")]
    NotInStore(String),
}

impl CacheError {
    /// Builds a `NotFound` error from any debuggable key.
    pub fn not_found<K: std::fmt::Debug>(key: &K) -> Self {
        CacheError::NotFound(format!("{:?}", key))
    }

    /// Builds a `NotInStore` error from any debuggable key.
    pub fn not_in_store<K: std::fmt::Debug>(key: &K) -> Self {
        CacheError::NotInStore(format!("{:?}", key))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache containers.
pub type Result<T> = std::result::Result<T, CacheError>;
