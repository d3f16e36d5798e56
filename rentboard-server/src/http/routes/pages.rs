//! Landing page, admin page and raw upload serving

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State, handler::HandlerWithoutStateExt, http::Uri, response::Html, routing::get,
    Router,
};
use tower_http::services::ServeDir;

use crate::http::error::ApiError;
use crate::http::extractors::AdminAccess;
use crate::http::server::AppState;

const LANDING_PAGE: &str = "index.html";
const ADMIN_PAGE: &str = "admin.html";

async fn read_page(dir: &Path, name: &'static str) -> Result<Html<String>, ApiError> {
    match tokio::fs::read_to_string(dir.join(name)).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ApiError::NotFound {
            resource: "page",
            id: name.to_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// GET /
async fn landing(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    read_page(&state.config.static_dir, LANDING_PAGE).await
}

/// GET /admin?key=... - the page itself; its data calls are gated again
async fn admin_page(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    read_page(&state.config.static_dir, ADMIN_PAGE).await
}

/// Fallback for `/uploads/*` names with no file behind them.
async fn missing_upload(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "upload",
        id: uri.path().trim_start_matches('/').to_owned(),
    }
}

/// Page routes. `/uploads/*` serves the upload directory without access control.
pub fn router(upload_dir: &Path) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing))
        .route("/admin", get(admin_page))
        .nest_service(
            "/uploads",
            ServeDir::new(upload_dir).not_found_service(missing_upload.into_service()),
        )
}
