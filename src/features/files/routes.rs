use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    create_folder, delete_file, delete_folder, download_file, manager, rename_item, search_files,
    upload_file,
};
use crate::features::files::services::{FileService, FolderService};

/// Multipart framing allowance on top of the configured file size
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct FilesState {
    pub files: Arc<FileService>,
    pub folders: Arc<FolderService>,
}

impl FromRef<FilesState> for Arc<FileService> {
    fn from_ref(state: &FilesState) -> Self {
        state.files.clone()
    }
}

impl FromRef<FilesState> for Arc<FolderService> {
    fn from_ref(state: &FilesState) -> Self {
        state.folders.clone()
    }
}

/// Create routes for the file manager and its JSON endpoints
pub fn routes(state: FilesState, max_upload_size: usize) -> Router {
    Router::new()
        .route("/File/Manager", get(manager))
        .route(
            "/File/Upload",
            post(upload_file)
                .layer(DefaultBodyLimit::max(max_upload_size + MULTIPART_OVERHEAD)),
        )
        .route("/File/CreateFolder", post(create_folder))
        .route("/File/Delete", post(delete_file))
        .route("/File/DeleteFolder", post(delete_folder))
        .route("/File/Rename", post(rename_item))
        .route("/File/Search", get(search_files))
        .route("/File/Download", get(download_file))
        .with_state(state)
}
