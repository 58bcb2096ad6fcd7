use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Role;
use crate::features::dashboard::dtos::DashboardDto;
use crate::features::files::dtos::FileResponseDto;
use crate::modules::backend::{FileStore, FolderStore, UserStore};
use crate::shared::constants::RECENT_FILES_LIMIT;

/// Service for the per-user quota dashboard
pub struct DashboardService {
    users: Arc<dyn UserStore>,
    files: Arc<dyn FileStore>,
    folders: Arc<dyn FolderStore>,
}

impl DashboardService {
    pub fn new(
        users: Arc<dyn UserStore>,
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
    ) -> Self {
        Self {
            users,
            files,
            folders,
        }
    }

    /// Quota, account-wide totals and the most recent uploads
    pub async fn get_dashboard(&self, user_id: &str) -> Result<DashboardDto> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let total_files = self.files.count(user_id).await?;
        let total_folders = self.folders.count(user_id).await?;
        let recent_files = self
            .files
            .recent(user_id, RECENT_FILES_LIMIT)
            .await?
            .into_iter()
            .map(FileResponseDto::from)
            .collect();

        Ok(DashboardDto {
            usage_percent: user.usage_percent(),
            role: Role::from_admin_flag(user.is_admin).as_str().to_string(),
            user_name: user.full_name,
            storage_used_mb: user.storage_used_mb.round_dp(2),
            storage_limit_mb: user.storage_limit_mb.round_dp(2),
            total_files,
            total_folders,
            recent_files,
            error: None,
        })
    }
}
