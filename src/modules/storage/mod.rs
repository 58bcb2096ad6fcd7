//! Storage module for file contents
//!
//! `BlobStore` is the raw object-store seam (implemented by `MinIOClient`).
//! `StorageClient` sits on top of it and owns key layout, the download
//! fallback for inconsistently stored paths, and error wrapping.

mod minio_client;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

pub use minio_client::MinIOClient;

/// Raw object operations against a single bucket
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn bucket_name(&self) -> String;

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// `Ok(None)` when the object does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> Result<()>;

    fn public_url(&self, key: &str) -> String;
}

/// Location of a freshly uploaded blob
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub key: String,
    pub url: String,
}

pub struct StorageClient {
    store: Arc<dyn BlobStore>,
}

impl StorageClient {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn bucket_name(&self) -> String {
        self.store.bucket_name()
    }

    /// Upload a user's file under `{user_id}/{uuid}_{file_name}`
    pub async fn upload(
        &self,
        user_id: &str,
        file_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob> {
        let key = object_key(user_id, Uuid::new_v4(), file_name);

        self.store
            .put(&key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Error uploading file: {}", detail(&e))))?;

        let url = self.file_url(&key);
        Ok(StoredBlob { key, url })
    }

    /// Download a blob by its stored path.
    ///
    /// If the stored path yields nothing and `user_id` is known, the path is
    /// retried with the `{user_id}/` prefix, for rows written without it.
    pub async fn download(&self, path: &str, user_id: Option<&str>) -> Result<Vec<u8>> {
        let key = normalize_key(path, &self.store.bucket_name());
        if key.is_empty() {
            return Err(AppError::BadRequest(
                "Error downloading file: File path cannot be empty".to_string(),
            ));
        }

        let mut last_error: Option<AppError> = None;

        match self.store.get(&key).await {
            Ok(Some(bytes)) if !bytes.is_empty() => return Ok(bytes),
            Ok(_) => {}
            Err(e) => last_error = Some(e),
        }

        if let Some(user_id) = user_id.filter(|id| !id.is_empty()) {
            let fallback = owner_scoped_key(&key, user_id);
            if fallback != key {
                debug!("Retrying download of '{}' as '{}'", key, fallback);
                match self.store.get(&fallback).await {
                    Ok(Some(bytes)) if !bytes.is_empty() => return Ok(bytes),
                    Ok(_) => {}
                    Err(e) => last_error = Some(e),
                }
            }
        }

        let reason = last_error
            .map(|e| detail(&e))
            .unwrap_or_else(|| "File is empty or not found".to_string());

        Err(AppError::Storage(format!("Error downloading file: {}", reason)))
    }

    /// Remove a user's blob; the key is always forced under `{user_id}/`
    pub async fn remove(&self, path: &str, user_id: &str) -> Result<()> {
        let key = normalize_key(path, &self.store.bucket_name());
        if key.is_empty() {
            return Err(AppError::BadRequest(
                "Error deleting file: File path cannot be empty".to_string(),
            ));
        }

        let key = owner_scoped_key(&key, user_id);

        self.store
            .delete(&key)
            .await
            .map_err(|e| AppError::Storage(format!("Error deleting file: {}", detail(&e))))
    }

    pub fn file_url(&self, path: &str) -> String {
        self.store
            .public_url(&normalize_key(path, &self.store.bucket_name()))
    }
}

/// Build the object key for an upload
pub fn object_key(user_id: &str, id: Uuid, file_name: &str) -> String {
    format!("{}/{}_{}", user_id, id, file_name)
}

/// Normalise a stored path into a bucket key.
///
/// Backslashes become slashes and leading slashes are dropped. A full URL
/// is cut down to whatever follows `/{bucket}/`.
pub fn normalize_key(path: &str, bucket: &str) -> String {
    let mut key = path.replace('\\', "/");

    if key.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("http")) {
        // ASCII lowercasing keeps byte offsets aligned with `key`
        let marker = format!("/{}/", bucket.to_ascii_lowercase());
        if let Some(idx) = key.to_ascii_lowercase().find(&marker) {
            key = key[idx + marker.len()..].to_string();
        }
    }

    key.trim_start_matches('/').to_string()
}

/// Prefix `key` with `{user_id}/` unless it already starts with it
pub fn owner_scoped_key(key: &str, user_id: &str) -> String {
    let prefix = format!("{}/", user_id);
    if key
        .get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(&prefix))
    {
        key.to_string()
    } else {
        format!("{}{}", prefix, key)
    }
}

fn detail(error: &AppError) -> String {
    match error {
        AppError::Storage(msg) | AppError::BadRequest(msg) | AppError::Internal(msg) => {
            msg.clone()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::MemoryBlobStore;

    const BUCKET: &str = "cloud-drive-files";

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("\\u1\\a.txt", BUCKET), "u1/a.txt");
        assert_eq!(normalize_key("/u1/a.txt", BUCKET), "u1/a.txt");
        assert_eq!(
            normalize_key(
                "https://cdn.example.com/storage/v1/object/public/cloud-drive-files/u1/x_a.txt",
                BUCKET
            ),
            "u1/x_a.txt"
        );
        // URL from another bucket is left alone apart from slashes
        assert_eq!(
            normalize_key("http://host/other/u1/a.txt", BUCKET),
            "http://host/other/u1/a.txt"
        );
    }

    #[test]
    fn test_owner_scoped_key() {
        assert_eq!(owner_scoped_key("a.txt", "u1"), "u1/a.txt");
        assert_eq!(owner_scoped_key("u1/a.txt", "u1"), "u1/a.txt");
        assert_eq!(owner_scoped_key("U1/a.txt", "u1"), "U1/a.txt");
    }

    #[test]
    fn test_key_helpers_accept_multibyte_paths() {
        assert_eq!(normalize_key("aéé.txt", BUCKET), "aéé.txt");
        assert_eq!(normalize_key("/é", BUCKET), "é");
        assert_eq!(
            normalize_key("https://hÉst/cloud-drive-files/u1/ß_é.txt", BUCKET),
            "u1/ß_é.txt"
        );

        let user_id = "0192f1f4-7a3b-7c1d-9e2f-3a4b5c6d7e8f";
        let long_name = format!("{}é.txt", "a".repeat(36));
        assert_eq!(
            owner_scoped_key(&long_name, user_id),
            format!("{}/{}", user_id, long_name)
        );
        assert_eq!(owner_scoped_key("ü", "u1"), "u1/ü");
    }

    #[tokio::test]
    async fn test_upload_uses_user_prefix() {
        let store = Arc::new(MemoryBlobStore::new(BUCKET));
        let client = StorageClient::new(store.clone());

        let blob = client
            .upload("u1", "notes.txt", b"hello".to_vec(), "text/plain")
            .await
            .unwrap();

        assert!(blob.key.starts_with("u1/"));
        assert!(blob.key.ends_with("_notes.txt"));
        assert!(blob.url.ends_with(&blob.key));
        assert_eq!(store.object(&blob.key), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_download_falls_back_to_owner_prefix() {
        let store = Arc::new(MemoryBlobStore::new(BUCKET));
        store.insert_object("u1/abc_report.pdf", b"pdf".to_vec());
        let client = StorageClient::new(store);

        let bytes = client.download("abc_report.pdf", Some("u1")).await.unwrap();
        assert_eq!(bytes, b"pdf".to_vec());

        let err = client.download("abc_report.pdf", None).await.unwrap_err();
        assert_eq!(
            err.client_message(),
            "Error downloading file: File is empty or not found"
        );
    }

    #[tokio::test]
    async fn test_download_treats_empty_object_as_missing() {
        let store = Arc::new(MemoryBlobStore::new(BUCKET));
        store.insert_object("empty.bin", Vec::new());
        store.insert_object("u1/empty.bin", b"real".to_vec());
        let client = StorageClient::new(store);

        let bytes = client.download("/empty.bin", Some("u1")).await.unwrap();
        assert_eq!(bytes, b"real".to_vec());
    }

    #[tokio::test]
    async fn test_remove_forces_owner_prefix() {
        let store = Arc::new(MemoryBlobStore::new(BUCKET));
        store.insert_object("u1/x_a.txt", b"a".to_vec());
        let client = StorageClient::new(store.clone());

        client.remove("x_a.txt", "u1").await.unwrap();
        assert_eq!(store.object("u1/x_a.txt"), None);
    }
}
