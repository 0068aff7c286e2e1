//! Key-value binding used by the KV handler.
//!
//! Values cross the binding as JSON text, mirroring edge KV namespaces where
//! callers serialize on `put` and parse on read. Backends make no
//! cross-key guarantees: two `put`s are two independent writes.

pub mod memory;
pub mod spanner;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::KvBackend;

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

/// Upper bound on keys returned by a single listing
pub const MAX_LIST_LIMIT: usize = 1000;

/// A key returned by [`KvStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct KeyInfo {
    pub name: String,
}

/// Filters applied to a key listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub limit: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            limit: MAX_LIST_LIMIT,
        }
    }
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Raw value stored under `key`, or `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Keys in lexicographic order, filtered by `options`
    async fn list(&self, options: &ListOptions) -> Result<Vec<KeyInfo>>;
}

/// Read `key` and parse it as JSON
pub async fn get_json(store: &dyn KvStore, key: &str) -> Result<Option<JsonValue>> {
    match store.get(key).await? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Stored value for '{}' is not valid JSON", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and store it under `key`
pub async fn put_json<T>(store: &dyn KvStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized + Sync,
{
    let raw = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for '{}'", key))?;
    store.put(key, raw).await
}

/// Open the backend selected by configuration
pub async fn open(backend: &KvBackend) -> Result<Arc<dyn KvStore>> {
    match backend {
        KvBackend::Memory => {
            tracing::info!("Using in-memory key-value store");
            Ok(Arc::new(MemoryStore::new()))
        }
        KvBackend::Spanner(config) => Ok(Arc::new(SpannerStore::from_config(config).await?)),
    }
}
