mod auth_dto;

pub use auth_dto::{AuthFormView, LoginForm, RegisterForm};
