use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{
    BreadcrumbDto, DeleteFolderSummaryDto, FileResponseDto, FolderResponseDto, ManagerViewDto,
};
use crate::features::files::services::FileService;
use crate::modules::backend::{FolderRow, FolderStore, NewFolder, UserStore};
use crate::shared::validation::validate_item_name;

/// Service for folder operations and the file manager view
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    users: Arc<dyn UserStore>,
    file_service: Arc<FileService>,
}

impl FolderService {
    pub fn new(
        folders: Arc<dyn FolderStore>,
        users: Arc<dyn UserStore>,
        file_service: Arc<FileService>,
    ) -> Self {
        Self {
            folders,
            users,
            file_service,
        }
    }

    /// Folders whose parent is `parent_id` (`None` = root)
    pub async fn list_folders(
        &self,
        user_id: &str,
        parent_id: Option<i64>,
    ) -> Result<Vec<FolderRow>> {
        self.folders.list(user_id, parent_id).await
    }

    pub async fn create(
        &self,
        user_id: &str,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<FolderRow> {
        let folder_name = validate_item_name(name, "Folder name is required")?;

        if let Some(parent_id) = parent_id {
            self.folders
                .find(parent_id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent folder not found".to_string()))?;
        }

        let folder = self
            .folders
            .insert(NewFolder {
                user_id: user_id.to_string(),
                folder_name,
                parent_folder_id: parent_id,
            })
            .await?;

        info!("Folder created: id={}, user={}", folder.id, user_id);
        Ok(folder)
    }

    /// Soft-delete a folder, its descendants and every file inside them.
    ///
    /// Individual file failures are counted and logged; the rest continue.
    pub async fn delete_folder(
        &self,
        user_id: &str,
        folder_id: i64,
    ) -> Result<DeleteFolderSummaryDto> {
        let root = self
            .folders
            .find(folder_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;

        let folder_ids = self.collect_subtree(user_id, root.id).await?;

        let mut file_ids = Vec::new();
        for id in &folder_ids {
            for file in self.file_service.list_files(user_id, Some(*id)).await? {
                file_ids.push(file.id);
            }
        }

        let mut summary = DeleteFolderSummaryDto {
            folders_deleted: self.folders.soft_delete_many(&folder_ids, user_id).await?,
            ..Default::default()
        };

        for file_id in file_ids {
            match self.file_service.delete(user_id, file_id).await {
                Ok(_) => summary.files_deleted += 1,
                Err(e) => {
                    warn!(
                        "Failed to delete file {} in folder {}: {}",
                        file_id,
                        root.id,
                        e.client_message()
                    );
                    summary.files_failed += 1;
                }
            }
        }

        info!(
            "Folder {} deleted: {} folders, {} files, {} failed",
            root.id, summary.folders_deleted, summary.files_deleted, summary.files_failed
        );

        Ok(summary)
    }

    /// Breadth-first walk over child folders, `root_id` first
    async fn collect_subtree(&self, user_id: &str, root_id: i64) -> Result<Vec<i64>> {
        let mut visited = HashSet::from([root_id]);
        let mut queue = VecDeque::from([root_id]);
        let mut ids = Vec::new();

        while let Some(id) = queue.pop_front() {
            ids.push(id);
            for child in self.folders.list(user_id, Some(id)).await? {
                if visited.insert(child.id) {
                    queue.push_back(child.id);
                }
            }
        }

        Ok(ids)
    }

    /// Folders from the top level down to `folder_id`.
    ///
    /// A missing parent ends the walk; a repeated id stops it.
    pub async fn folder_trail(&self, user_id: &str, folder_id: i64) -> Result<Vec<FolderRow>> {
        let mut trail = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(folder_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                warn!("Folder cycle detected at {} for user {}", id, user_id);
                break;
            }

            match self.folders.find(id, user_id).await? {
                Some(folder) => {
                    current = folder.parent_folder_id;
                    trail.push(folder);
                }
                None => break,
            }
        }

        trail.reverse();
        Ok(trail)
    }

    /// Slash-separated path of a folder, `/` for the root
    pub async fn folder_path(&self, user_id: &str, folder_id: Option<i64>) -> Result<String> {
        let Some(folder_id) = folder_id else {
            return Ok("/".to_string());
        };

        let trail = self.folder_trail(user_id, folder_id).await?;
        Ok(path_from_trail(&trail))
    }

    pub async fn rename(
        &self,
        user_id: &str,
        folder_id: i64,
        new_name: &str,
    ) -> Result<FolderRow> {
        let name = validate_item_name(new_name, "New name is required")?;

        self.folders
            .rename(folder_id, user_id, &name)
            .await?
            .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))
    }

    /// Everything the file manager page needs for one folder
    pub async fn browse(&self, user_id: &str, folder_id: Option<i64>) -> Result<ManagerViewDto> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut view = ManagerViewDto {
            user_name: user.full_name.clone(),
            folder_id,
            path: "/".to_string(),
            breadcrumbs: Vec::new(),
            folders: Vec::new(),
            files: Vec::new(),
            storage_used_mb: user.storage_used_mb.round_dp(2),
            storage_limit_mb: user.storage_limit_mb.round_dp(2),
            usage_percent: user.usage_percent(),
            error: None,
        };

        if let Some(id) = folder_id {
            if self.folders.find(id, user_id).await?.is_none() {
                view.error = Some("Folder not found".to_string());
                return Ok(view);
            }

            let trail = self.folder_trail(user_id, id).await?;
            view.path = path_from_trail(&trail);
            view.breadcrumbs = trail
                .into_iter()
                .map(|f| BreadcrumbDto {
                    id: f.id,
                    name: f.folder_name,
                })
                .collect();
        }

        view.folders = self
            .folders
            .list(user_id, folder_id)
            .await?
            .into_iter()
            .map(FolderResponseDto::from)
            .collect();
        view.files = self
            .file_service
            .list_files(user_id, folder_id)
            .await?
            .into_iter()
            .map(FileResponseDto::from)
            .collect();

        Ok(view)
    }
}

fn path_from_trail(trail: &[FolderRow]) -> String {
    let names: Vec<&str> = trail.iter().map(|f| f.folder_name.as_str()).collect();
    format!("/{}", names.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::services::UploadInput;
    use crate::shared::test_helpers::{seeded_backend, TestServices};

    fn upload(name: &str, folder_id: Option<i64>) -> UploadInput {
        UploadInput {
            data: vec![0u8; 1024],
            file_name: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            folder_id,
        }
    }

    #[tokio::test]
    async fn test_create_folder_validates_name_and_parent() {
        let (backend, user_id) = seeded_backend();
        let t = TestServices::new(backend.clone());

        let folder = t.folders.create(&user_id, "  Photos ", None).await.unwrap();
        assert_eq!(folder.folder_name, "Photos");
        assert_eq!(folder.parent_folder_id, None);

        let err = t.folders.create(&user_id, "   ", None).await.unwrap_err();
        assert_eq!(err.client_message(), "Folder name is required");

        let err = t
            .folders
            .create(&user_id, "Nested", Some(424242))
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Parent folder not found");

        let other = backend.add_user("other@example.com");
        let err = t
            .folders
            .create(&other, "Sneaky", Some(folder.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Duplicate sibling names are allowed
        t.folders.create(&user_id, "Photos", None).await.unwrap();
        assert_eq!(t.folders.list_folders(&user_id, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_folder_path() {
        let (backend, user_id) = seeded_backend();
        let a = backend.add_folder(&user_id, "A", None);
        let b = backend.add_folder(&user_id, "B", Some(a));
        let target = backend.add_folder(&user_id, "target", Some(b));
        let t = TestServices::new(backend);

        assert_eq!(t.folders.folder_path(&user_id, None).await.unwrap(), "/");
        assert_eq!(
            t.folders.folder_path(&user_id, Some(target)).await.unwrap(),
            "/A/B/target"
        );
    }

    #[tokio::test]
    async fn test_folder_path_terminates_on_cycle() {
        let (backend, user_id) = seeded_backend();
        let a = backend.add_folder(&user_id, "A", None);
        let b = backend.add_folder(&user_id, "B", Some(a));
        backend.set_folder_parent(a, Some(b));
        let t = TestServices::new(backend);

        let path = t.folders.folder_path(&user_id, Some(b)).await.unwrap();
        assert_eq!(path, "/A/B");
    }

    #[tokio::test]
    async fn test_folder_path_stops_at_missing_parent() {
        let (backend, user_id) = seeded_backend();
        let orphan = backend.add_folder(&user_id, "Orphan", Some(777));
        let t = TestServices::new(backend);

        assert_eq!(
            t.folders.folder_path(&user_id, Some(orphan)).await.unwrap(),
            "/Orphan"
        );
    }

    #[tokio::test]
    async fn test_delete_folder_is_recursive() {
        let (backend, user_id) = seeded_backend();
        let t = TestServices::new(backend.clone());
        let top = t.folders.create(&user_id, "Top", None).await.unwrap();
        let mid = t.folders.create(&user_id, "Mid", Some(top.id)).await.unwrap();
        let leaf = t.folders.create(&user_id, "Leaf", Some(mid.id)).await.unwrap();
        let keep = t.folders.create(&user_id, "Keep", None).await.unwrap();

        let f1 = t.files.upload(&user_id, upload("1.bin", Some(top.id))).await.unwrap();
        let f2 = t.files.upload(&user_id, upload("2.bin", Some(leaf.id))).await.unwrap();
        let f3 = t.files.upload(&user_id, upload("3.bin", Some(keep.id))).await.unwrap();

        let summary = t.folders.delete_folder(&user_id, top.id).await.unwrap();

        assert_eq!(
            summary,
            DeleteFolderSummaryDto {
                folders_deleted: 3,
                files_deleted: 2,
                files_failed: 0,
            }
        );
        assert!(backend.file(f1.id).unwrap().is_deleted);
        assert!(backend.file(f2.id).unwrap().is_deleted);
        assert!(!backend.file(f3.id).unwrap().is_deleted);
        assert!(backend.folder(leaf.id).unwrap().is_deleted);
        assert!(!backend.folder(keep.id).unwrap().is_deleted);
        assert_eq!(t.blobs.object_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_folder_continues_past_failures() {
        let (backend, user_id) = seeded_backend();
        let t = TestServices::new(backend.clone());
        let folder = t.folders.create(&user_id, "Docs", None).await.unwrap();
        let f1 = t.files.upload(&user_id, upload("1.bin", Some(folder.id))).await.unwrap();
        let f2 = t.files.upload(&user_id, upload("2.bin", Some(folder.id))).await.unwrap();
        let f3 = t.files.upload(&user_id, upload("3.bin", Some(folder.id))).await.unwrap();
        backend.fail_soft_delete_of(f2.id);

        let summary = t.folders.delete_folder(&user_id, folder.id).await.unwrap();

        assert_eq!(summary.files_deleted, 2);
        assert_eq!(summary.files_failed, 1);
        assert!(backend.file(f1.id).unwrap().is_deleted);
        assert!(!backend.file(f2.id).unwrap().is_deleted);
        assert!(backend.file(f3.id).unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_delete_folder_handles_cycles() {
        let (backend, user_id) = seeded_backend();
        let a = backend.add_folder(&user_id, "A", None);
        let b = backend.add_folder(&user_id, "B", Some(a));
        backend.set_folder_parent(a, Some(b));
        let t = TestServices::new(backend.clone());

        let summary = t.folders.delete_folder(&user_id, a).await.unwrap();
        assert_eq!(summary.folders_deleted, 2);

        let err = t.folders.delete_folder(&user_id, a).await.unwrap_err();
        assert_eq!(err.client_message(), "Folder not found");
    }

    #[tokio::test]
    async fn test_rename_folder() {
        let (backend, user_id) = seeded_backend();
        let t = TestServices::new(backend);
        let folder = t.folders.create(&user_id, "Old", None).await.unwrap();

        let renamed = t.folders.rename(&user_id, folder.id, "New").await.unwrap();
        assert_eq!(renamed.folder_name, "New");

        let err = t.folders.rename(&user_id, 5555, "New").await.unwrap_err();
        assert_eq!(err.client_message(), "Folder not found");
    }

    #[tokio::test]
    async fn test_browse_lists_one_level_with_breadcrumbs() {
        let (backend, user_id) = seeded_backend();
        let t = TestServices::new(backend);
        let docs = t.folders.create(&user_id, "Docs", None).await.unwrap();
        let work = t.folders.create(&user_id, "Work", Some(docs.id)).await.unwrap();
        t.files.upload(&user_id, upload("cv.pdf", Some(docs.id))).await.unwrap();
        t.files.upload(&user_id, upload("root.txt", None)).await.unwrap();

        let view = t.folders.browse(&user_id, Some(docs.id)).await.unwrap();
        assert_eq!(view.path, "/Docs");
        assert_eq!(view.breadcrumbs.len(), 1);
        assert_eq!(view.folders.len(), 1);
        assert_eq!(view.folders[0].id, work.id);
        assert_eq!(view.files.len(), 1);
        assert_eq!(view.files[0].file_name, "cv.pdf");
        assert!(view.error.is_none());

        let missing = t.folders.browse(&user_id, Some(9999)).await.unwrap();
        assert_eq!(missing.error.as_deref(), Some("Folder not found"));
        assert!(missing.files.is_empty());
    }
}
