//! S3-compatible object store.

use async_trait::async_trait;
use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{ObjectStore, StoreError};
use crate::config::StoreConfig;
use crate::utils::error_chain;

/// Uploads to a single bucket with static credentials and path-style addressing.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3ObjectStore {
    pub fn new(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "streamrelay",
        );

        let s3_config = S3ConfigBuilder::new()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL of an object in this store's bucket.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, StoreError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Upload(error_chain(&e)))?;

        tracing::info!("Uploaded {} ({} bytes) to bucket {}", key, size, self.bucket);
        Ok(self.object_url(key))
    }
}
