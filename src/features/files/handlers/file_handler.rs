use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileRequest, DownloadQuery, FileResponseDto, SearchQuery, UploadFileDto,
};
use crate::features::files::services::{FileService, UploadInput};
use crate::shared::types::ApiResponse;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: the file to upload (required)
/// - `folderId`: target folder (optional, root when omitted or empty)
#[utoipa::path(
    post,
    path = "/File/Upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "No file selected"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Folder not found"),
        (status = 507, description = "Storage limit exceeded")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let mut upload: Option<(Vec<u8>, String, String)> = None;
    let mut folder_id: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let file_name = field.file_name().unwrap_or("").to_string();

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                upload = Some((data.to_vec(), file_name, content_type));
            }
            "folderId" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read folderId field: {}", e))
                })?;
                folder_id = parse_folder_id(&text)?;
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (data, file_name, content_type) = upload
        .filter(|(data, _, _)| !data.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file selected".to_string()))?;

    let file = service
        .upload(
            &user.user_id,
            UploadInput {
                data,
                file_name,
                content_type,
                folder_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(FileResponseDto::from(file)),
        Some("File uploaded successfully".to_string()),
    )))
}

/// Delete a file and release its quota
#[utoipa::path(
    post,
    path = "/File/Delete",
    tag = "files",
    request_body = DeleteFileRequest,
    responses(
        (status = 200, description = "File deleted successfully"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppJson(request): AppJson<DeleteFileRequest>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user.user_id, request.file_id).await?;
    Ok(Json(ApiResponse::message("File deleted successfully")))
}

/// Search file names in one folder level
#[utoipa::path(
    get,
    path = "/File/Search",
    tag = "files",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching files", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 400, description = "Search query is required"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn search_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let term = params.query.unwrap_or_default();

    let files = service
        .search(&user.user_id, &term, params.folder_id)
        .await?
        .into_iter()
        .map(FileResponseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(Some(files), None)))
}

/// Download the contents of a file as an attachment
#[utoipa::path(
    get,
    path = "/File/Download",
    tag = "files",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found"),
        (status = 502, description = "Object storage unavailable")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(params): Query<DownloadQuery>,
) -> Result<Response> {
    let (file, data) = service.download(&user.user_id, params.id).await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(&file.file_name))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Empty means root
fn parse_folder_id(raw: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::BadRequest("Invalid folder id".to_string()))
}

fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}
