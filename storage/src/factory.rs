//! Factory function for creating storage backends.

use crate::{LocalStorage, MemoryStorage, Result, S3Storage, StorageBackend, StorageConfig};
use std::sync::Arc;
use tracing::info;

/// Create a storage backend from configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use storage::{create_storage, StorageConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let target = create_storage(StorageConfig::s3_from_config()?).await?;
///     Ok(())
/// }
/// ```
pub async fn create_storage(config: StorageConfig) -> Result<Arc<dyn StorageBackend>> {
    info!(backend = %config.backend_type(), "creating storage backend");

    match config {
        StorageConfig::S3(s3_config) => Ok(Arc::new(S3Storage::new(s3_config).await?)),
        StorageConfig::Local(local_config) => Ok(Arc::new(LocalStorage::new(local_config)?)),
        StorageConfig::Memory => Ok(Arc::new(MemoryStorage::new())),
    }
}
