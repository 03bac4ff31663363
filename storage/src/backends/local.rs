//! Local file system storage backend.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::LocalConfig;
use crate::{Result, StorageBackend, StorageError};

/// Files stored under a base directory on disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the base path is missing or not a directory.
    pub fn new(config: LocalConfig) -> Result<Self> {
        let base_path = PathBuf::from(config.base_path);

        if !base_path.exists() {
            return Err(StorageError::ConfigError(format!(
                "Base path does not exist: {}",
                base_path.display()
            )));
        }

        if !base_path.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "Base path is not a directory: {}",
                base_path.display()
            )));
        }

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to a path under the base directory.
    ///
    /// Keys that try to climb out of the base directory are refused.
    fn get_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir
                    | std::path::Component::RootDir
                    | std::path::Component::Prefix(_)
            )
        });
        if escapes {
            return Err(StorageError::PermissionDenied(name.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
        let path = self.get_path(name)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, content).await?;

        Ok(name.to_string())
    }

    async fn open(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.get_path(name)?;

        if !path.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        Ok(fs::read(&path).await?)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.get_path(name)?;

        if !path.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        fs::remove_file(&path).await?;
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.get_path(name)?;
        Ok(path.is_file())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.base_path) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn url(&self, name: &str, _expiry_secs: u64) -> Result<String> {
        let path = self.get_path(name)?;

        if !path.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let abs_path = path.canonicalize()?;
        Ok(format!("file://{}", abs_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> LocalStorage {
        LocalStorage::new(LocalConfig {
            base_path: dir.path().to_string_lossy().into_owned(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn save_then_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir);

        store.save("files/issue_1/a.txt", b"hello").await.unwrap();

        assert!(store.exists("files/issue_1/a.txt").await.unwrap());
        assert_eq!(store.open("files/issue_1/a.txt").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn list_walks_nested_directories_and_filters_by_prefix() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir);
        store.save("s3/files/a.txt", b"1").await.unwrap();
        store.save("s3/files/deep/b.txt", b"2").await.unwrap();
        store.save("files/c.txt", b"3").await.unwrap();

        let keys = store.list("s3/").await.unwrap();

        assert_eq!(keys, vec!["s3/files/a.txt", "s3/files/deep/b.txt"]);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir);

        assert!(!store.exists("nope.txt").await.unwrap());
        assert!(matches!(
            store.open("nope.txt").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("nope.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_base_directory() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir);

        assert!(matches!(
            store.save("../outside.txt", b"x").await,
            Err(StorageError::PermissionDenied(_))
        ));
    }

    #[test]
    fn missing_base_path_is_a_config_error() {
        let err = LocalStorage::new(LocalConfig {
            base_path: "/definitely/not/here".into(),
        })
        .unwrap_err();
        assert!(matches!(err, StorageError::ConfigError(_)));
    }
}
