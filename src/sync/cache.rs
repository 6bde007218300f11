//! Shared query cache keyed by query name
//!
//! Values are stored as JSON so one cache holds every entity type. Writes are
//! last-write-wins per key.

use std::{collections::HashMap, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use super::error::SyncResult;

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed read; an entry that does not decode as `T` is treated as absent
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.read().await.get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Cache entry {} has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> SyncResult<()> {
        let value = serde_json::to_value(value)?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().await.remove(key)
    }

    /// Drop `prefix` and every key below it (`prefix:...`), returning how many went
    pub async fn invalidate(&self, prefix: &str) -> usize {
        let scoped = format!("{}:", prefix);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key != prefix && !key.starts_with(&scoped));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Invalidated {} cached queries under {}", removed, prefix);
        }
        removed
    }

    /// Raw copy of an entry, to be handed back to [`QueryCache::restore`]
    pub async fn snapshot(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Put a snapshot back; `None` removes the entry
    pub async fn restore(&self, key: &str, snapshot: Option<Value>) {
        let mut entries = self.entries.write().await;
        match snapshot {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_typed_get_set() {
        let cache = QueryCache::new();
        cache.set("numbers", &vec![1, 2, 3]).await.unwrap();
        assert_eq!(cache.get::<Vec<i32>>("numbers").await, Some(vec![1, 2, 3]));
        assert_eq!(cache.get::<String>("numbers").await, None);
        assert_eq!(cache.get::<Vec<i32>>("missing").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = QueryCache::new();
        cache.set("parts", &1).await.unwrap();
        cache.set("parts:4", &2).await.unwrap();
        cache.set("parts_lookup", &3).await.unwrap();
        cache.set("equipment", &4).await.unwrap();

        assert_eq!(cache.invalidate("parts").await, 2);
        assert_eq!(cache.keys().await, vec!["equipment".to_string(), "parts_lookup".to_string()]);
    }

    #[tokio::test]
    async fn test_snapshot_restore() {
        let cache = QueryCache::new();
        cache.set("list", &vec!["a"]).await.unwrap();
        let snap = cache.snapshot("list").await;

        cache.set("list", &vec!["b"]).await.unwrap();
        cache.restore("list", snap).await;
        assert_eq!(cache.get::<Vec<String>>("list").await, Some(vec!["a".to_string()]));

        cache.restore("list", None).await;
        assert!(!cache.contains("list").await);
    }
}
