//! In-process storage backend. Used by tests in place of a real bucket.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{Result, StorageBackend, StorageError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    writes: Arc<RwLock<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls since creation.
    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }

    /// Snapshot of every stored key, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
        self.objects
            .write()
            .await
            .insert(name.to_string(), content.to_vec());
        *self.writes.write().await += 1;
        Ok(name.to_string())
    }

    async fn open(&self, name: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.objects
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.objects.read().await.contains_key(name))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn url(&self, name: &str, _expiry_secs: u64) -> Result<String> {
        if !self.exists(name).await? {
            return Err(StorageError::NotFound(name.to_string()));
        }
        Ok(format!("memory://{name}"))
    }
}
