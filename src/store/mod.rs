//! Object storage for uploaded files.

mod s3;

pub use s3::S3ObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to upload file: {0}")]
    Upload(String),
}

/// Destination for uploaded files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key` and return the object's URL.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, StoreError>;
}

/// Object key for an upload: `path/name`, or just `name` without a path.
pub fn object_key(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", path, name)
    }
}
