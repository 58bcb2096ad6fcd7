mod file_service;
mod folder_service;

pub use file_service::{FileService, UploadInput};
pub use folder_service::FolderService;
