//! Cache store contract.
//!
//! Values are opaque, pre-serialized JSON documents addressed by string keys. Entries never
//! expire; they are overwritten by population and extended by the write path.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("failed to encode cache entry `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode cache entry `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache entry `{key}` does not hold a list")]
    NotAList { key: String },
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Key-value store holding serialized views.
///
/// Single-key operations are atomic. `prepend` is an atomic read-modify-write on one key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Raw value at `key`; absence is not an error.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError>;

    async fn contains(&self, key: &str) -> Result<bool, CacheError>;

    /// Insert the JSON `element` at the front of the JSON list stored at `key`, creating the
    /// list when absent. Returns the new list length.
    async fn prepend(&self, key: &str, element: Bytes) -> Result<usize, CacheError>;
}
