//! In-process cache store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use serde_json::Value;

use super::store::{CacheError, CacheStore};

const EMPTY_LIST: &[u8] = b"[]";

/// Cache store backed by a concurrent map living in the server process.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, Bytes>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of every entry, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, Bytes> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.contains_key(key))
    }

    async fn prepend(&self, key: &str, element: Bytes) -> Result<usize, CacheError> {
        let element: Value = serde_json::from_slice(&element).map_err(|source| {
            CacheError::Decode {
                key: key.to_string(),
                source,
            }
        })?;

        // The shard stays write-locked until the entry guard drops.
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Bytes::from_static(EMPTY_LIST));

        let mut list = match serde_json::from_slice::<Value>(entry.value()) {
            Ok(Value::Array(list)) => list,
            _ => {
                return Err(CacheError::NotAList {
                    key: key.to_string(),
                });
            }
        };
        list.insert(0, element);
        let len = list.len();

        let encoded =
            serde_json::to_vec(&Value::Array(list)).map_err(|source| CacheError::Encode {
                key: key.to_string(),
                source,
            })?;
        *entry.value_mut() = Bytes::from(encoded);

        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn get_returns_none_for_missing_key() {
        let store = MemoryCacheStore::new();
        assert!(store.get("user_1").await.expect("get").is_none());
        assert!(!store.contains("user_1").await.expect("contains"));
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = MemoryCacheStore::new();
        store
            .set("product_1", Bytes::from_static(b"1"))
            .await
            .expect("set");
        store
            .set("product_1", Bytes::from_static(b"2"))
            .await
            .expect("set");

        assert_eq!(
            store.get("product_1").await.expect("get"),
            Some(Bytes::from_static(b"2"))
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn prepend_creates_missing_list() {
        let store = MemoryCacheStore::new();
        let len = store
            .prepend("product_9_comments", Bytes::from_static(br#"{"a":1}"#))
            .await
            .expect("prepend");

        assert_eq!(len, 1);
        let raw = store
            .get("product_9_comments")
            .await
            .expect("get")
            .expect("list exists");
        let value: Value = serde_json::from_slice(&raw).expect("json");
        assert_eq!(value, serde_json::json!([{ "a": 1 }]));
    }

    #[tokio::test]
    async fn prepend_puts_element_first() {
        let store = MemoryCacheStore::new();
        store
            .set("list", Bytes::from_static(b"[2,3]"))
            .await
            .expect("set");

        let len = store
            .prepend("list", Bytes::from_static(b"1"))
            .await
            .expect("prepend");

        assert_eq!(len, 3);
        assert_eq!(
            store.get("list").await.expect("get"),
            Some(Bytes::from_static(b"[1,2,3]"))
        );
    }

    #[tokio::test]
    async fn prepend_rejects_non_list_entry() {
        let store = MemoryCacheStore::new();
        store
            .set("user_1", Bytes::from_static(br#"{"id":1}"#))
            .await
            .expect("set");

        let err = store
            .prepend("user_1", Bytes::from_static(b"1"))
            .await
            .expect_err("object is not a list");
        assert!(matches!(err, CacheError::NotAList { .. }));
    }

    #[tokio::test]
    async fn concurrent_prepends_are_not_lost() {
        let store = Arc::new(MemoryCacheStore::new());
        let mut handles = Vec::new();
        for n in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .prepend("hot", Bytes::from(n.to_string()))
                    .await
                    .expect("prepend");
            }));
        }
        for handle in handles {
            handle.await.expect("task");
        }

        let raw = store.get("hot").await.expect("get").expect("list");
        let list: Vec<u32> = serde_json::from_slice(&raw).expect("json");
        assert_eq!(list.len(), 32);
    }
}
