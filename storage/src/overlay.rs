//! Path conventions for attachments that have moved into the bucket.
//!
//! A stored attachment path is either a legacy media path
//! (`files/issue_1/event_4/main.py`) or, once migrated, the same path with
//! the S3 prefix in front (`s3/files/issue_1/event_4/main.py`). The prefixed
//! form is also the object key inside the bucket.

use util::config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Overlay {
    prefix: String,
    public_base: Option<String>,
}

impl S3Overlay {
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            prefix,
            public_base: None,
        }
    }

    /// Base URL objects are served from, e.g. `https://s3.example.org/anytask`.
    pub fn with_public_base(mut self, base: impl Into<String>) -> Self {
        self.public_base = Some(base.into().trim_end_matches('/').to_string());
        self
    }

    /// Prefix from `S3_PATH_PREFIX`; public base from `S3_ENDPOINT` and `S3_BUCKET`.
    pub fn from_config() -> Self {
        let overlay = Self::new(config::s3_path_prefix());
        match (config::s3_endpoint(), config::s3_bucket()) {
            (Some(endpoint), Some(bucket)) => overlay.with_public_base(format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                bucket
            )),
            _ => overlay,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_s3_stored(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Destination key for a legacy path. Already-prefixed paths are returned unchanged.
    pub fn append_s3_prefix(&self, path: &str) -> String {
        if self.is_s3_stored(path) {
            return path.to_string();
        }
        format!("{}{}", self.prefix, path.trim_start_matches('/'))
    }

    /// Public URL for a bucket-resident path, `None` for legacy paths or
    /// when no public base is configured.
    pub fn public_url(&self, path: &str) -> Option<String> {
        if !self.is_s3_stored(path) {
            return None;
        }
        self.public_base
            .as_ref()
            .map(|base| format!("{base}/{path}"))
    }
}

impl Default for S3Overlay {
    fn default() -> Self {
        Self::new("s3/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalised_with_trailing_slash() {
        assert_eq!(S3Overlay::new("bucket").prefix(), "bucket/");
        assert_eq!(S3Overlay::new("s3/").prefix(), "s3/");
    }

    #[test]
    fn append_and_detect_prefix() {
        let overlay = S3Overlay::default();
        let dest = overlay.append_s3_prefix("files/issue_1/a.py");

        assert_eq!(dest, "s3/files/issue_1/a.py");
        assert!(overlay.is_s3_stored(&dest));
        assert!(!overlay.is_s3_stored("files/issue_1/a.py"));
        assert_eq!(overlay.append_s3_prefix(&dest), dest);
    }

    #[test]
    fn public_url_only_for_bucket_paths() {
        let overlay = S3Overlay::default().with_public_base("http://minio:9000/anytask/");

        assert_eq!(
            overlay.public_url("s3/files/a.py").as_deref(),
            Some("http://minio:9000/anytask/s3/files/a.py")
        );
        assert_eq!(overlay.public_url("files/a.py"), None);
        assert_eq!(S3Overlay::default().public_url("s3/files/a.py"), None);
    }
}
