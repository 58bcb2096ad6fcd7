pub mod auth_handler;

pub use auth_handler::{login, login_page, logout, register, register_page, DASHBOARD_PATH};
