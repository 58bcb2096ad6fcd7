mod file_handler;
mod folder_handler;

pub use file_handler::*;
pub use folder_handler::*;
