//! Configuration types for storage backends.

use crate::{Result, StorageError};
use std::str::FromStr;
use util::config;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    S3,
    Local,
    Memory,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::S3 => write!(f, "S3"),
            BackendType::Local => write!(f, "Local"),
            BackendType::Memory => write!(f, "Memory"),
        }
    }
}

impl FromStr for BackendType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(BackendType::S3),
            "local" => Ok(BackendType::Local),
            "memory" => Ok(BackendType::Memory),
            _ => Err(StorageError::ConfigError(format!(
                "Invalid backend type: {}",
                s
            ))),
        }
    }
}

/// Configuration for S3 storage backend.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// AWS region (e.g., "us-east-1")
    pub region: Option<String>,
    /// Custom endpoint URL (MinIO, Ceph, ...)
    pub endpoint: Option<String>,
}

/// Configuration for local file system backend.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub base_path: String,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    S3(S3Config),
    Local(LocalConfig),
    Memory,
}

impl StorageConfig {
    pub fn backend_type(&self) -> BackendType {
        match self {
            StorageConfig::S3(_) => BackendType::S3,
            StorageConfig::Local(_) => BackendType::Local,
            StorageConfig::Memory => BackendType::Memory,
        }
    }

    /// The legacy media root (`STORAGE_ROOT`), where attachments are written
    /// before migration.
    pub fn legacy_from_config() -> Self {
        StorageConfig::Local(LocalConfig {
            base_path: util::paths::storage_root().to_string_lossy().into_owned(),
        })
    }

    /// The S3 bucket attachments migrate into.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` when `S3_BUCKET` is not set.
    pub fn s3_from_config() -> Result<Self> {
        let bucket = config::s3_bucket().ok_or_else(|| {
            StorageError::ConfigError("S3_BUCKET environment variable not set".to_string())
        })?;

        Ok(StorageConfig::S3(S3Config {
            bucket,
            region: config::s3_region(),
            endpoint: config::s3_endpoint(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use util::config::AppConfig;

    #[test]
    fn backend_type_parses_case_insensitively() {
        assert_eq!("S3".parse::<BackendType>().unwrap(), BackendType::S3);
        assert_eq!("local".parse::<BackendType>().unwrap(), BackendType::Local);
        assert!("ftp".parse::<BackendType>().is_err());
    }

    #[test]
    #[serial]
    fn s3_config_requires_a_bucket() {
        AppConfig::set_s3_bucket(None);
        assert!(matches!(
            StorageConfig::s3_from_config(),
            Err(StorageError::ConfigError(_))
        ));

        AppConfig::set_s3_bucket(Some("anytask".into()));
        let cfg = StorageConfig::s3_from_config().unwrap();
        assert_eq!(cfg.backend_type(), BackendType::S3);

        AppConfig::reset();
    }
}
