use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;

/// Register, login and logout pages
pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route(
            "/Auth/Register",
            get(handlers::register_page).post(handlers::register),
        )
        .route("/Auth/Login", get(handlers::login_page).post(handlers::login))
        .route("/Auth/Logout", post(handlers::logout))
        .with_state(service)
}
