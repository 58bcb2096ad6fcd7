use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::guards::{MaybeUser, RequirePageUser};
use crate::features::auth::handlers::DASHBOARD_PATH;
use crate::features::dashboard::dtos::{DashboardDto, HomeViewDto};
use crate::features::dashboard::services::DashboardService;
use crate::shared::constants::DEFAULT_STORAGE_LIMIT_MB;
use crate::shared::views::render_view;

/// Landing page; signed-in users go straight to their dashboard
pub async fn home(MaybeUser(user): MaybeUser) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let view = HomeViewDto {
        default_quota_mb: DEFAULT_STORAGE_LIMIT_MB,
    };
    Ok(render_view("home.html", view)?.into_response())
}

/// Quota dashboard; failures render the page with an error banner
pub async fn dashboard(
    RequirePageUser(user): RequirePageUser,
    State(service): State<Arc<DashboardService>>,
) -> Result<Response> {
    match service.get_dashboard(&user.user_id).await {
        Ok(view) => Ok(render_view("dashboard.html", view)?.into_response()),
        Err(e) => {
            e.log();
            let html = render_view("dashboard.html", DashboardDto::failed(e.client_message()))?;
            Ok((e.status_code(), html).into_response())
        }
    }
}
