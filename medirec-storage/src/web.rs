//! In-process store for the browser runtime.
//!
//! Stands in for the browser's origin-scoped key/value store: contents
//! live for the duration of the process and are scoped to this instance.

use crate::error::StorageResult;
use crate::StorageService;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Origin-embedded key/value store for the web runtime.
#[derive(Default)]
pub struct WebStorage {
    entries: RwLock<HashMap<String, Value>>,
}

impl WebStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageService for WebStorage {
    fn name(&self) -> &'static str {
        "web-origin-store"
    }

    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    async fn save(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
