//! Attachment storage.
//!
//! Every place files are kept (the legacy local media root, the S3 bucket,
//! an in-memory map in tests) is reached through [`StorageBackend`]. Stored
//! paths that already live in the bucket carry a fixed prefix; see
//! [`S3Overlay`].

pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod overlay;

pub use backend::StorageBackend;
pub use backends::{local::LocalStorage, memory::MemoryStorage, s3::S3Storage};
pub use config::StorageConfig;
pub use error::{Result, StorageError};
pub use factory::create_storage;
pub use overlay::S3Overlay;
