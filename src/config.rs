//! Runtime configuration.
//!
//! Values are resolved once at startup (CLI flags with environment fallbacks,
//! see `cli`) and handed to each component explicitly. Nothing below reads the
//! environment.

use std::fmt;
use std::time::Duration;

use crate::fetch::USER_AGENT;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
/// Upload body limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 100;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

// Object store defaults target a local S3 emulator.
pub const DEFAULT_AWS_REGION: &str = "ap-southeast-1";
pub const DEFAULT_AWS_ACCESS_KEY_ID: &str = "test";
pub const DEFAULT_AWS_SECRET_ACCESS_KEY: &str = "test";
pub const DEFAULT_S3_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_S3_BUCKET: &str = "my-bucket";

/// Complete configuration for the `serve` command.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub fetch: FetchConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl ServerConfig {
    /// Request body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

/// S3-compatible object storage settings.
#[derive(Clone)]
pub struct StoreConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    pub bucket: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_AWS_REGION.to_string(),
            access_key_id: DEFAULT_AWS_ACCESS_KEY_ID.to_string(),
            secret_access_key: DEFAULT_AWS_SECRET_ACCESS_KEY.to_string(),
            endpoint: DEFAULT_S3_ENDPOINT.to_string(),
            bucket: DEFAULT_S3_BUCKET.to_string(),
        }
    }
}

/// Outbound fetch settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Longest wait for a connection, the response headers or the next body
    /// chunk. A transfer that keeps making progress is not limited.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_upload_bytes() {
        let config = ServerConfig {
            max_upload_mb: 2,
            ..Default::default()
        };
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_store_config_debug_redacts_secret() {
        let config = StoreConfig {
            secret_access_key: "hunter2".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("my-bucket"));
    }
}
