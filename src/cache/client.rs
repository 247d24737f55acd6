//! Typed access to the cache store.

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};

use super::keys::CacheKey;
use super::store::{CacheError, CacheStore};

pub const METRIC_CACHE_HIT_TOTAL: &str = "storefront_cache_hit_total";
pub const METRIC_CACHE_MISS_TOTAL: &str = "storefront_cache_miss_total";
pub const METRIC_CACHE_WRITE_TOTAL: &str = "storefront_cache_write_total";

/// JSON codec over a [`CacheStore`], shared by the population job and the request handlers.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn CacheStore>,
}

impl CacheClient {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Decoded value at `key`; `None` when nothing has been cached there yet.
    pub async fn get<T>(&self, key: &CacheKey) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let name = key.to_string();
        let Some(raw) = self.store.get(&name).await? else {
            counter!(METRIC_CACHE_MISS_TOTAL).increment(1);
            return Ok(None);
        };
        counter!(METRIC_CACHE_HIT_TOTAL).increment(1);

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| CacheError::Decode { key: name, source })
    }

    /// Decoded value at `key`, or `T::default()` when absent.
    pub async fn get_or_default<T>(&self, key: &CacheKey) -> Result<T, CacheError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    pub async fn set<T>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let name = key.to_string();
        let encoded = encode(&name, value)?;
        self.store.set(&name, encoded).await?;
        counter!(METRIC_CACHE_WRITE_TOTAL).increment(1);
        Ok(())
    }

    pub async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError> {
        self.store.contains(&key.to_string()).await
    }

    /// Atomically insert `element` at the front of the list at `key`; returns the new length.
    pub async fn prepend<T>(&self, key: &CacheKey, element: &T) -> Result<usize, CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let name = key.to_string();
        let encoded = encode(&name, element)?;
        let len = self.store.prepend(&name, encoded).await?;
        counter!(METRIC_CACHE_WRITE_TOTAL).increment(1);
        Ok(len)
    }
}

fn encode<T>(key: &str, value: &T) -> Result<Bytes, CacheError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })
}
