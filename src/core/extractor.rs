//! JSON body extraction for the file manager API.
//!
//! Rejections become `AppError`s so every failure reaches the client in the
//! usual `ApiResponse` envelope. Field-level problems (wrong type, missing
//! field) are validation errors and fill the envelope's `errors` list.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// `Json<T>` that rejects with `AppError`
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(rejection_error)
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => AppError::Validation(err.body_text()),
        JsonRejection::JsonSyntaxError(_) => {
            AppError::BadRequest("Request body is not valid JSON".to_string())
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::BadRequest("Expected an application/json request body".to_string())
        }
        other => AppError::BadRequest(other.body_text()),
    }
}
