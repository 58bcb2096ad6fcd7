mod file_dto;
mod folder_dto;

pub use file_dto::*;
pub use folder_dto::*;
