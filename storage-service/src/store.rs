//! Object store backends
//!
//! `S3ObjectStore` talks to AWS S3 or any S3-compatible endpoint (MinIO).
//! `MemoryObjectStore` backs unit tests and models presigned-URL expiry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Blob storage boundary: upload an object, produce a time-limited read URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `body` under `key` with the given content type.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Produce a read-only URL for `key`, valid for `ttl`. Side-effect free:
    /// repeated calls yield independent URLs with independent expiry windows.
    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> StorageResult<String>;
}

/// S3-backed object store
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build an S3 client from configuration
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Initializing object store"
        );

        let credentials = aws_sdk_s3::config::Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "mediclaim-s3",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.use_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> StorageResult<()> {
        debug!(bucket = %self.bucket, key = %key, size = body.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

#[derive(Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory object store for tests
///
/// Presigned URLs carry an explicit expiry timestamp so tests can check the
/// TTL window without a live bucket.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    put_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Raw bytes stored under `key`, if any.
    pub async fn object_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).map(|o| o.bytes.clone())
    }

    pub async fn object_content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// Number of uploads attempted against the backend.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Dereference a URL previously returned by `presigned_get_url`,
    /// honoring its expiry timestamp.
    pub async fn fetch_url(&self, url: &str) -> StorageResult<Vec<u8>> {
        let (key, expires_at) = parse_memory_url(url)?;
        if chrono::Utc::now().timestamp() > expires_at {
            return Err(StorageError::NotFound(format!("URL expired for {key}")));
        }
        self.object_bytes(&key)
            .await
            .ok_or_else(|| StorageError::NotFound(key))
    }
}

fn parse_memory_url(url: &str) -> StorageResult<(String, i64)> {
    let rest = url
        .strip_prefix("memory://")
        .ok_or_else(|| StorageError::NotFound(url.to_string()))?;
    let (key, query) = rest
        .split_once("?expires=")
        .ok_or_else(|| StorageError::NotFound(url.to_string()))?;
    let expires_at = query
        .parse::<i64>()
        .map_err(|_| StorageError::NotFound(url.to_string()))?;
    Ok((key.to_string(), expires_at))
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes: body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        if !self.objects.read().await.contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let expires_at = chrono::Utc::now().timestamp() + ttl.as_secs() as i64;
        Ok(format!("memory://{key}?expires={expires_at}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_presign_round_trips_bytes() {
        let store = MemoryObjectStore::new();
        store
            .put("abc/doc.pdf", b"claim form".to_vec(), "application/pdf")
            .await
            .unwrap();

        let url = store
            .presigned_get_url("abc/doc.pdf", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.fetch_url(&url).await.unwrap(), b"claim form");
        assert_eq!(
            store.object_content_type("abc/doc.pdf").await.as_deref(),
            Some("application/pdf")
        );
    }

    #[tokio::test]
    async fn presign_missing_key_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store
            .presigned_get_url("nope", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_url_no_longer_resolves() {
        let store = MemoryObjectStore::new();
        store
            .put("k", b"x".to_vec(), "text/plain")
            .await
            .unwrap();

        let url = store
            .presigned_get_url("k", Duration::from_secs(0))
            .await
            .unwrap();
        // A zero-second window is already in the past by the time we fetch.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(store.fetch_url(&url).await.is_err());
    }
}
