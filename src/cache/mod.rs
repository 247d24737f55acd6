//! Storefront cache.
//!
//! Pages are served from denormalized JSON views kept in a key-value store:
//!
//! - **Memory**: a concurrent map inside the server process (default).
//! - **Redis**: a shared Redis server, selected with `cache.backend = "redis"`.
//!
//! ```toml
//! [cache]
//! backend = "redis"
//! redis_url = "redis://127.0.0.1:6379/"
//! persist_comments = false
//! ```

mod client;
mod config;
mod keys;
mod memory;
mod redis_store;
mod store;

use std::sync::Arc;

pub use client::{
    CacheClient, METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_MISS_TOTAL, METRIC_CACHE_WRITE_TOTAL,
};
pub use config::{CacheBackend, CacheConfig};
pub use keys::CacheKey;
pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;
pub use store::{CacheError, CacheStore};

/// Open the store selected by `config`.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match &config.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCacheStore::new())),
        CacheBackend::Redis { url } => Ok(Arc::new(RedisCacheStore::connect(url).await?)),
    }
}
