use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::FileResponseDto;
use crate::modules::backend::FolderRow;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponseDto {
    pub id: i64,
    pub folder_name: String,
    pub parent_folder_id: Option<i64>,
    pub created_on: DateTime<Utc>,
}

impl From<FolderRow> for FolderResponseDto {
    fn from(folder: FolderRow) -> Self {
        Self {
            id: folder.id,
            folder_name: folder.folder_name,
            parent_folder_id: folder.parent_folder_id,
            created_on: folder.created_on,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub folder_name: String,
    pub parent_folder_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderRequest {
    pub folder_id: i64,
}

/// Outcome of a recursive folder delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderSummaryDto {
    /// Folders soft-deleted, the target included
    pub folders_deleted: u64,
    pub files_deleted: u64,
    /// Files that could not be deleted; the rest were still processed
    pub files_failed: u64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ManagerQuery {
    /// Folder to open, the root when omitted
    pub folder_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreadcrumbDto {
    pub id: i64,
    pub name: String,
}

/// Everything the file manager page shows
#[derive(Debug, Serialize)]
pub struct ManagerViewDto {
    pub user_name: String,
    pub folder_id: Option<i64>,
    pub path: String,
    pub breadcrumbs: Vec<BreadcrumbDto>,
    pub folders: Vec<FolderResponseDto>,
    pub files: Vec<FileResponseDto>,
    pub storage_used_mb: Decimal,
    pub storage_limit_mb: Decimal,
    pub usage_percent: f64,
    pub error: Option<String>,
}

impl ManagerViewDto {
    /// Empty root listing carrying only an error banner
    pub fn failed(folder_id: Option<i64>, message: String) -> Self {
        Self {
            user_name: String::new(),
            folder_id,
            path: "/".to_string(),
            breadcrumbs: Vec::new(),
            folders: Vec::new(),
            files: Vec::new(),
            storage_used_mb: Decimal::ZERO,
            storage_limit_mb: Decimal::ZERO,
            usage_percent: 0.0,
            error: Some(message),
        }
    }
}
