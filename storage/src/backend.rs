//! Storage backend trait definition.

use crate::Result;
use async_trait::async_trait;

/// Unified interface over every place attachments are kept.
///
/// Names are `/`-separated keys relative to the backend root, e.g.
/// `files/issue_3/event_9/main.py` or `s3/files/issue_3/event_9/main.py`.
///
/// # Examples
///
/// ```rust,no_run
/// use storage::{StorageBackend, Result};
///
/// async fn copy(from: &dyn StorageBackend, to: &dyn StorageBackend, key: &str) -> Result<()> {
///     let bytes = from.open(key).await?;
///     to.save(key, &bytes).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Save a file, overwriting any previous content.
    ///
    /// Returns the key the content was stored under.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PermissionDenied` if write access is denied.
    /// Returns `StorageError::NetworkError` if network communication fails.
    async fn save(&self, name: &str, content: &[u8]) -> Result<String>;

    /// Read a file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file doesn't exist.
    async fn open(&self, name: &str) -> Result<Vec<u8>>;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file doesn't exist.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Check whether a file exists.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// List every key starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// A URL a client can use to download the file.
    ///
    /// Cloud backends return a presigned URL valid for `expiry_secs`.
    async fn url(&self, name: &str, expiry_secs: u64) -> Result<String>;
}
