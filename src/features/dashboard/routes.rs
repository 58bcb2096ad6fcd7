use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Landing page and quota dashboard
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/Home/Dashboard", get(handlers::dashboard))
        .with_state(dashboard_service)
}
