use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyInfo, KvStore, ListOptions};

/// Process-local store, lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        tracing::debug!("Stored key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.entries.write().await.remove(key).is_none() {
            tracing::debug!("Delete of absent key: {}", key);
        }
        Ok(())
    }

    async fn list(&self, options: &ListOptions) -> Result<Vec<KeyInfo>> {
        let entries = self.entries.read().await;
        let prefix = options.prefix.as_deref().unwrap_or("");

        // BTreeMap iterates in key order, so the prefix range is contiguous
        let keys = entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .take(options.limit)
            .map(|(key, _)| KeyInfo { name: key.clone() })
            .collect();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(keys: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for key in keys {
            store.put(key, "null".to_string()).await.unwrap();
        }
        store
    }

    fn names(keys: Vec<KeyInfo>) -> Vec<String> {
        keys.into_iter().map(|k| k.name).collect()
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("users", "[1]".to_string()).await.unwrap();
        store.put("users", "[2]".to_string()).await.unwrap();

        assert_eq!(store.get("users").await.unwrap(), Some("[2]".to_string()));
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("missing").await.unwrap();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = seeded(&["users", "products", "orders"]).await;

        let keys = store.list(&ListOptions::default()).await.unwrap();
        assert_eq!(names(keys), vec!["orders", "products", "users"]);
    }

    #[tokio::test]
    async fn test_list_prefix_and_limit() {
        let store = seeded(&["user-1", "user-2", "user-3", "product-1", "userx"]).await;

        let options = ListOptions {
            prefix: Some("user-".to_string()),
            limit: 2,
        };
        let keys = store.list(&options).await.unwrap();
        assert_eq!(names(keys), vec!["user-1", "user-2"]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let store = MemoryStore::new();
        assert!(store.list(&ListOptions::default()).await.unwrap().is_empty());
    }
}
