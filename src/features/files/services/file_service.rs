use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::modules::backend::{bytes_to_mb, FileRow, FileStore, FolderStore, NewFile, UserStore};
use crate::modules::storage::StorageClient;
use crate::shared::constants::MAX_ITEM_NAME_LEN;
use crate::shared::validation::validate_item_name;

/// A file received from the browser
#[derive(Debug)]
pub struct UploadInput {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub folder_id: Option<i64>,
}

/// Service for file operations
pub struct FileService {
    files: Arc<dyn FileStore>,
    folders: Arc<dyn FolderStore>,
    users: Arc<dyn UserStore>,
    storage: Arc<StorageClient>,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<StorageClient>,
    ) -> Self {
        Self {
            files,
            folders,
            users,
            storage,
        }
    }

    /// Files directly inside `folder_id` (`None` = root)
    pub async fn list_files(&self, user_id: &str, folder_id: Option<i64>) -> Result<Vec<FileRow>> {
        self.files.list(user_id, folder_id).await
    }

    /// Store the blob, then record it and charge the owner's quota.
    ///
    /// If recording fails the blob is removed again.
    pub async fn upload(&self, user_id: &str, input: UploadInput) -> Result<FileRow> {
        let file_size = input.data.len() as i64;
        let size_mb = bytes_to_mb(file_size);

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // Early reject; the transactional charge below is authoritative
        if user.storage_used_mb + size_mb > user.storage_limit_mb {
            return Err(AppError::StorageLimitExceeded(
                "Storage limit exceeded".to_string(),
            ));
        }

        if let Some(folder_id) = input.folder_id {
            self.folders
                .find(folder_id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;
        }

        let file_name = base_file_name(&input.file_name);

        let blob = self
            .storage
            .upload(user_id, &file_name, input.data, &input.content_type)
            .await?;

        debug!("Blob stored: {}", blob.key);

        let new_file = NewFile {
            user_id: user_id.to_string(),
            file_name,
            file_path: blob.key.clone(),
            content_type: input.content_type,
            file_size,
            folder_id: input.folder_id,
            storage_url: blob.url,
        };

        match self.files.insert_charging_quota(new_file, size_mb).await {
            Ok(file) => {
                info!(
                    "File uploaded: id={}, key={}, size={}",
                    file.id, file.file_path, file.file_size
                );
                Ok(file)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.remove(&blob.key, user_id).await {
                    warn!(
                        "Failed to remove orphaned blob '{}': {}",
                        blob.key,
                        cleanup.client_message()
                    );
                }
                Err(e)
            }
        }
    }

    /// Soft-delete a file and release its quota; the blob is removed afterwards
    pub async fn delete(&self, user_id: &str, file_id: i64) -> Result<FileRow> {
        let file = self
            .files
            .soft_delete_releasing_quota(file_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if let Err(e) = self.storage.remove(&file.file_path, user_id).await {
            warn!(
                "File {} deleted but blob '{}' was not removed: {}",
                file.id,
                file.file_path,
                e.client_message()
            );
        }

        info!("File deleted: id={}, user={}", file.id, user_id);
        Ok(file)
    }

    /// Case-insensitive name search within one folder level (root by default)
    pub async fn search(
        &self,
        user_id: &str,
        term: &str,
        folder_id: Option<i64>,
    ) -> Result<Vec<FileRow>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::BadRequest(
                "Search query is required".to_string(),
            ));
        }

        self.files.search(user_id, folder_id, term).await
    }

    /// Metadata and contents of a live file owned by `user_id`
    pub async fn download(&self, user_id: &str, file_id: i64) -> Result<(FileRow, Vec<u8>)> {
        let file = self
            .files
            .find(file_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let data = self
            .storage
            .download(&file.file_path, Some(user_id))
            .await?;

        Ok((file, data))
    }

    pub async fn rename(&self, user_id: &str, file_id: i64, new_name: &str) -> Result<FileRow> {
        let name = validate_item_name(new_name, "New name is required")?;

        self.files
            .rename(file_id, user_id, &name)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }
}

/// Last path component of an uploaded file name.
///
/// Names longer than `MAX_ITEM_NAME_LEN` characters are shortened, keeping
/// a short extension.
fn base_file_name(raw: &str) -> String {
    let name = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("").trim();

    if name.is_empty() {
        return "unnamed".to_string();
    }

    if name.chars().count() <= MAX_ITEM_NAME_LEN {
        return name.to_string();
    }

    let extension = name
        .rfind('.')
        .map(|idx| &name[idx..])
        .filter(|ext| ext.chars().count() <= 16)
        .unwrap_or("");
    let stem_len = MAX_ITEM_NAME_LEN - extension.chars().count();
    let stem: String = name.chars().take(stem_len).collect();

    format!("{}{}", stem.trim_end(), extension)
}
