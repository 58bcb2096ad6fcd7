use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{AppConfig, SessionConfig, SwaggerConfig};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::{self, AuthService, SessionService};
use crate::features::dashboard::{self, DashboardService};
use crate::features::files::{self, FileService, FilesState, FolderService};
use crate::modules::backend::{FileStore, FolderStore, UserStore};
use crate::modules::storage::StorageClient;

/// Every service the HTTP layer needs, wired over the same stores
#[derive(Clone)]
pub struct AppServices {
    pub sessions: Arc<SessionService>,
    pub auth: Arc<AuthService>,
    pub files: Arc<FileService>,
    pub folders: Arc<FolderService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        file_store: Arc<dyn FileStore>,
        folder_store: Arc<dyn FolderStore>,
        storage: Arc<StorageClient>,
        session: SessionConfig,
    ) -> Self {
        let sessions = Arc::new(SessionService::new(session));
        let auth = Arc::new(AuthService::new(Arc::clone(&users), Arc::clone(&sessions)));
        let files = Arc::new(FileService::new(
            Arc::clone(&file_store),
            Arc::clone(&folder_store),
            Arc::clone(&users),
            storage,
        ));
        let folders = Arc::new(FolderService::new(
            Arc::clone(&folder_store),
            Arc::clone(&users),
            Arc::clone(&files),
        ));
        let dashboard = Arc::new(DashboardService::new(users, file_store, folder_store));

        Self {
            sessions,
            auth,
            files,
            folders,
            dashboard,
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Build the application router with swagger, session and tracing layers
pub fn build_router(services: &AppServices, app: &AppConfig, swagger: &SwaggerConfig) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: swagger.title.clone(),
        version: swagger.version.clone(),
        description: swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger_routes = if let Some(credentials) = swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let files_state = FilesState {
        files: Arc::clone(&services.files),
        folders: Arc::clone(&services.folders),
    };

    // Pages and APIs that read the session
    let session_routes = Router::new()
        .merge(auth::routes(Arc::clone(&services.auth)))
        .merge(files::routes(files_state, app.max_upload_size))
        .merge(dashboard::routes(Arc::clone(&services.dashboard)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.sessions),
            middleware::session_middleware,
        ));

    let health_route = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(swagger_routes)
        .merge(session_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(app.cors_allowed_origins.clone()))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
