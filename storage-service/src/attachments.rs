//! Attachment workflow
//!
//! An attachment is a single uploaded document tied to an owning record
//! (doctor, web user, or payment letter). `store` derives a collision-free
//! key namespaced by the owner, uploads the blob, and hands the key back for
//! persistence. `presign` turns a stored key back into a short-lived URL on
//! every read. Overwriting a slot replaces the key only; the previous blob
//! stays in the bucket (no garbage collection — known leak).

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// A file received from a multipart form, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename as sent by the client.
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores uploaded documents and signs read URLs for stored keys.
#[derive(Clone)]
pub struct AttachmentStore {
    store: Arc<dyn ObjectStore>,
    max_upload_bytes: usize,
    presign_ttl: Duration,
}

impl AttachmentStore {
    pub fn new(store: Arc<dyn ObjectStore>, max_upload_bytes: usize, presign_ttl_secs: u32) -> Self {
        Self {
            store,
            max_upload_bytes,
            presign_ttl: Duration::from_secs(presign_ttl_secs as u64),
        }
    }

    /// Upload `file` on behalf of `owner_id` and return the storage key.
    ///
    /// The size limit is enforced before any storage I/O. On error no key is
    /// returned, so the caller cannot persist a dangling reference.
    pub async fn store(&self, file: &UploadedFile, owner_id: &str) -> StorageResult<String> {
        if file.bytes.len() > self.max_upload_bytes {
            return Err(StorageError::FileTooLarge {
                size_bytes: file.bytes.len(),
                limit_bytes: self.max_upload_bytes,
            });
        }

        let key = format!("{}/{}-{}", owner_id, Uuid::new_v4(), file.name);
        self.store
            .put(&key, file.bytes.clone(), &file.content_type)
            .await?;

        debug!(key = %key, size = file.bytes.len(), "Attachment stored");
        Ok(key)
    }

    /// Sign a read URL for a stored key, valid for the configured TTL.
    pub async fn presign(&self, key: &str) -> StorageResult<String> {
        self.store.presigned_get_url(key, self.presign_ttl).await
    }

    /// Sign an optional slot. A null slot passes through as `None` — it is
    /// never signed and never turned into an empty string.
    pub async fn presign_opt(&self, key: Option<String>) -> StorageResult<Option<String>> {
        match key {
            Some(key) => Ok(Some(self.presign(&key).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
    use crate::store::MemoryObjectStore;

    fn attachments(backend: Arc<MemoryObjectStore>) -> AttachmentStore {
        AttachmentStore::new(backend, DEFAULT_MAX_UPLOAD_BYTES, 3600)
    }

    fn pdf(bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            name: "statement.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn stored_key_is_namespaced_by_owner() {
        let backend = MemoryObjectStore::new();
        let store = attachments(backend.clone());

        let key = store.store(&pdf(b"abc"), "owner-1").await.unwrap();
        assert!(key.starts_with("owner-1/"));
        assert!(key.ends_with("-statement.pdf"));
        assert_eq!(backend.object_bytes(&key).await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn same_filename_different_owners_never_collides() {
        let backend = MemoryObjectStore::new();
        let store = attachments(backend.clone());

        let k1 = store.store(&pdf(b"one"), "owner-1").await.unwrap();
        let k2 = store.store(&pdf(b"two"), "owner-2").await.unwrap();

        assert_ne!(k1, k2);
        assert_eq!(backend.object_bytes(&k1).await.unwrap(), b"one");
        assert_eq!(backend.object_bytes(&k2).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn oversized_file_rejected_before_any_storage_call() {
        let backend = MemoryObjectStore::new();
        let store = attachments(backend.clone());

        let big = pdf(&vec![0u8; 15 * 1024 * 1024]);
        let err = store.store(&big, "owner-1").await.unwrap_err();

        assert!(matches!(err, StorageError::FileTooLarge { .. }));
        assert_eq!(backend.put_calls(), 0);
    }

    #[tokio::test]
    async fn presign_twice_yields_two_working_urls() {
        let backend = MemoryObjectStore::new();
        let store = attachments(backend.clone());

        let key = store.store(&pdf(b"claim"), "owner-1").await.unwrap();
        let url1 = store.presign(&key).await.unwrap();
        let url2 = store.presign(&key).await.unwrap();

        assert_eq!(backend.fetch_url(&url1).await.unwrap(), b"claim");
        assert_eq!(backend.fetch_url(&url2).await.unwrap(), b"claim");
        // Signing left the stored object untouched.
        assert_eq!(backend.put_calls(), 1);
    }

    #[tokio::test]
    async fn overwrite_leaves_previous_blob_retrievable() {
        let backend = MemoryObjectStore::new();
        let store = attachments(backend.clone());

        let old_key = store.store(&pdf(b"v1"), "owner-1").await.unwrap();
        let new_key = store.store(&pdf(b"v2"), "owner-1").await.unwrap();

        assert_ne!(old_key, new_key);
        // The record would now hold new_key, but the old object survives.
        assert_eq!(backend.object_bytes(&old_key).await.unwrap(), b"v1");
        assert_eq!(backend.object_bytes(&new_key).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn null_slot_passes_through_unsigned() {
        let backend = MemoryObjectStore::new();
        let store = attachments(backend);

        assert_eq!(store.presign_opt(None).await.unwrap(), None);
    }
}
