use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Default maximum upload size: 10 MiB per file.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default presigned URL validity window: one hour.
pub const DEFAULT_PRESIGN_TTL_SECS: u32 = 3600;

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible stores (MinIO). `None` uses AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub use_path_style: bool,
    pub max_upload_bytes: usize,
    pub presign_ttl_secs: u32,
}

impl StorageConfig {
    /// Load storage configuration from environment variables
    pub fn from_env() -> StorageResult<Self> {
        let bucket = std::env::var("AWS_S3_BUCKET_NAME")
            .map_err(|_| StorageError::Config("AWS_S3_BUCKET_NAME is not set".to_string()))?;

        Ok(Self {
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: std::env::var("S3_ACCESS_KEY")
                .or_else(|_| std::env::var("AWS_ACCESS_KEY_ID"))
                .unwrap_or_default(),
            secret_key: std::env::var("S3_SECRET_KEY")
                .or_else(|_| std::env::var("AWS_SECRET_ACCESS_KEY"))
                .unwrap_or_default(),
            bucket,
            use_path_style: std::env::var("S3_USE_PATH_STYLE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            presign_ttl_secs: std::env::var("PRESIGN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PRESIGN_TTL_SECS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env var mutations don't race across test threads.
    #[test]
    fn from_env_requires_bucket_and_applies_defaults() {
        std::env::remove_var("AWS_S3_BUCKET_NAME");
        assert!(StorageConfig::from_env().is_err());

        std::env::set_var("AWS_S3_BUCKET_NAME", "mediclaim-docs");
        std::env::remove_var("MAX_UPLOAD_BYTES");
        std::env::remove_var("PRESIGN_TTL_SECS");

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.bucket, "mediclaim-docs");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.presign_ttl_secs, DEFAULT_PRESIGN_TTL_SECS);
    }
}
