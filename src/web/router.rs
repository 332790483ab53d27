//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{
    CreateFolderRequest, FileResponse, FolderDetailResponse, FolderResponse, SessionResponse,
    StarRequest,
};
use super::handlers::{file, folder, page, session, storage, AppState};
use super::middleware::{create_cors_layer, session_auth, SessionState};
use crate::file::StorageUsage;

/// Multipart framing allowance on top of the configured upload size.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        folder::list_folders,
        folder::create_folder,
        folder::get_folder,
        file::list_files,
        file::upload_file,
        file::get_file,
        file::download_file,
        file::star_file,
        file::delete_file,
        storage::get_storage,
        session::get_session,
    ),
    components(schemas(
        CreateFolderRequest,
        StarRequest,
        FolderResponse,
        FolderDetailResponse,
        FileResponse,
        SessionResponse,
        StorageUsage,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "folders", description = "Folder management"),
        (name = "files", description = "Upload, star, download and delete"),
        (name = "storage", description = "Storage usage"),
        (name = "session", description = "Session status"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the page and API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let session_state = Arc::new(SessionState::new(
        app_state.sessions.clone(),
        app_state.cookie_name.clone(),
    ));
    let upload_limit = app_state.files.max_upload_size() as usize + MULTIPART_OVERHEAD;

    // Pages redirect instead of returning 401
    let page_routes = Router::new()
        .route("/", get(page::home_page))
        .route("/starred", get(page::starred_page))
        .route("/folder/:id", get(page::folder_page));

    let api_routes = Router::new()
        .route(
            "/folders",
            get(folder::list_folders).post(folder::create_folder),
        )
        .route("/folders/:id", get(folder::get_folder))
        .route(
            "/files",
            get(file::list_files)
                .post(file::upload_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/files/:id", get(file::get_file).delete(file::delete_file))
        .route("/files/:id/content", get(file::download_file))
        .route("/files/:id/star", put(file::star_file))
        .route("/storage", get(storage::get_storage))
        .route("/session", get(session::get_session));

    Router::new()
        .merge(page_routes)
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = session_state.clone();
                    session_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the router serving the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
