use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON envelope returned by every API endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            data,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            message,
            data: None,
            errors,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a confirmation message
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(None, Some(message.into()))
    }
}
