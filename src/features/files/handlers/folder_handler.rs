use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequirePageUser;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    CreateFolderRequest, DeleteFolderRequest, DeleteFolderSummaryDto, FolderResponseDto,
    ManagerQuery, ManagerViewDto, RenameRequest,
};
use crate::features::files::services::{FileService, FolderService};
use crate::shared::types::ApiResponse;
use crate::shared::views::render_view;

/// File manager page for one folder
pub async fn manager(
    RequirePageUser(user): RequirePageUser,
    State(service): State<Arc<FolderService>>,
    Query(params): Query<ManagerQuery>,
) -> Result<Response> {
    match service.browse(&user.user_id, params.folder_id).await {
        Ok(view) => Ok(render_view("manager.html", view)?.into_response()),
        Err(e) => {
            e.log();
            let view = ManagerViewDto::failed(params.folder_id, e.client_message());
            let html = render_view("manager.html", view)?;
            Ok((e.status_code(), html).into_response())
        }
    }
}

/// Create a folder
#[utoipa::path(
    post,
    path = "/File/CreateFolder",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder created successfully", body = ApiResponse<FolderResponseDto>),
        (status = 400, description = "Folder name is required"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Parent folder not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn create_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppJson(request): AppJson<CreateFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponseDto>>> {
    if request.folder_name.trim().is_empty() {
        return Err(AppError::BadRequest("Folder name is required".to_string()));
    }

    let folder = service
        .create(
            &user.user_id,
            &request.folder_name,
            request.parent_folder_id,
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(FolderResponseDto::from(folder)),
        Some("Folder created successfully".to_string()),
    )))
}

/// Delete a folder with everything inside it
#[utoipa::path(
    post,
    path = "/File/DeleteFolder",
    tag = "folders",
    request_body = DeleteFolderRequest,
    responses(
        (status = 200, description = "Folder deleted successfully", body = ApiResponse<DeleteFolderSummaryDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn delete_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppJson(request): AppJson<DeleteFolderRequest>,
) -> Result<Json<ApiResponse<DeleteFolderSummaryDto>>> {
    let summary = service
        .delete_folder(&user.user_id, request.folder_id)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(summary),
        Some("Folder deleted successfully".to_string()),
    )))
}

/// Rename a file or a folder
#[utoipa::path(
    post,
    path = "/File/Rename",
    tag = "folders",
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Renamed successfully"),
        (status = 400, description = "Invalid name"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File or folder not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn rename_item(
    user: AuthenticatedUser,
    State(folders): State<Arc<FolderService>>,
    State(files): State<Arc<FileService>>,
    AppJson(request): AppJson<RenameRequest>,
) -> Result<Json<ApiResponse<()>>> {
    if request.is_folder {
        folders
            .rename(&user.user_id, request.item_id, &request.new_name)
            .await?;
    } else {
        files
            .rename(&user.user_id, request.item_id, &request.new_name)
            .await?;
    }

    Ok(Json(ApiResponse::message("Renamed successfully")))
}
