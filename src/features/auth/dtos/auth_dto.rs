use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration form (urlencoded); missing fields are caught by validation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub confirm_password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,
}

/// Login form (urlencoded)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Checkbox value; absent when unchecked
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember_me(&self) -> bool {
        self.remember_me
            .as_deref()
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "on" | "1"))
    }
}

/// Values echoed back into a re-rendered auth form
#[derive(Debug, Default, Serialize)]
pub struct AuthFormView {
    pub email: String,
    pub full_name: String,
    pub error: Option<String>,
    pub errors: Vec<String>,
    pub flash: Option<String>,
}
