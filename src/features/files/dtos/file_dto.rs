use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::modules::backend::FileRow;

/// Upload form for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Target folder, omitted or empty for the root
    #[schema(example = "12")]
    pub folder_id: Option<String>,
}

/// File metadata as returned to the browser
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponseDto {
    pub id: i64,
    pub file_name: String,
    pub content_type: String,
    /// Size in bytes
    pub file_size: i64,
    /// Size in megabytes
    #[schema(value_type = String, example = "1.5")]
    pub size_mb: Decimal,
    /// Human readable size, e.g. "1.5 MB"
    pub size_display: String,
    pub uploaded_on: DateTime<Utc>,
    pub folder_id: Option<i64>,
    pub storage_url: String,
}

impl From<FileRow> for FileResponseDto {
    fn from(file: FileRow) -> Self {
        Self {
            size_mb: file.size_mb(),
            size_display: format_size(file.file_size),
            id: file.id,
            file_name: file.file_name,
            content_type: file.content_type,
            file_size: file.file_size,
            uploaded_on: file.uploaded_on,
            folder_id: file.folder_id,
            storage_url: file.storage_url,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub file_id: i64,
}

/// Rename a file or a folder
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub item_id: i64,
    #[serde(default)]
    pub new_name: String,
    #[serde(default)]
    pub is_folder: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive part of the file name
    pub query: Option<String>,
    /// Folder to search in, the root when omitted
    pub folder_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// File id
    pub id: i64,
}

/// Bytes formatted with binary units, one decimal above bytes
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}
