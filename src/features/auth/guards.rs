//! Identity guards.
//!
//! The session layer attaches `AuthenticatedUser` to the request when a valid
//! token is present. API handlers take `AuthenticatedUser` directly (JSON 401
//! when missing); pages use `RequirePageUser` or `MaybeUser`.

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};
use std::convert::Infallible;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

pub const LOGIN_PATH: &str = "/Auth/Login";

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Signed-in user for a page route; anonymous requests are redirected to login.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequirePageUser(user): RequirePageUser) { ... }
/// ```
pub struct RequirePageUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequirePageUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequirePageUser)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// Signed-in user if there is one
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}
