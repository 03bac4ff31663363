//! Amazon S3 (and S3-compatible) storage backend.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;
use tracing::debug;

use crate::config::S3Config;
use crate::{Result, StorageBackend, StorageError};

/// Objects stored in one bucket.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

fn network<E: std::error::Error>(err: E) -> StorageError {
    StorageError::NetworkError(DisplayErrorContext(err).to_string())
}

impl S3Storage {
    /// Build a client from the ambient AWS credential chain.
    ///
    /// A custom `endpoint` switches to path-style addressing, which MinIO and
    /// most self-hosted S3 implementations require.
    pub async fn new(config: S3Config) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::ConfigError("S3 bucket name is empty".into()));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .body(ByteStream::from(content.to_vec()))
            .send()
            .await
            .map_err(network)?;

        debug!(bucket = %self.bucket, key = name, bytes = content.len(), "put object");
        Ok(name.to_string())
    }

    async fn open(&self, name: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false)
                {
                    StorageError::NotFound(name.to_string())
                } else {
                    network(err)
                }
            })?;

        let body = output.body.collect().await.map_err(network)?;
        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if !self.exists(name).await? {
            return Err(StorageError::NotFound(name.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(network)?;
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(err) => Err(network(err)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(network)?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        debug!(bucket = %self.bucket, prefix, count = keys.len(), "listed objects");
        Ok(keys)
    }

    async fn url(&self, name: &str, expiry_secs: u64) -> Result<String> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expiry_secs))
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .presigned(presigning)
            .await
            .map_err(network)?;

        Ok(request.uri().to_string())
    }
}
