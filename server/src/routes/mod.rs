//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server is a static host for the single-page client. It answers the
//! configuration document the client's environment ladder fetches first,
//! serves the HTML shell for every client-side route so deep links and
//! reloads work, and falls back to the build directory for assets.
//!
//! A path missing from the build directory still gets the shell when its
//! last segment has no extension (`/login/`, `/nonexistent`), so the
//! client's own normalization and redirects run on a direct load. Missing
//! assets stay 404.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use schema::SPA_PATHS;
use schema::config::CONFIG_DOCUMENT_PATH;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir).fallback(get(deep_link).with_state(state.clone()));

    let mut router = Router::new()
        .route(CONFIG_DOCUMENT_PATH, get(config_document))
        .route("/healthz", get(healthz));
    for path in SPA_PATHS {
        router = router.route(path, get(spa_shell));
    }

    router
        .fallback_service(assets)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /config.json`. Never cached, so a redeploy with new keys takes
/// effect on the next load.
async fn config_document(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json(state.config.as_ref().clone()))
}

async fn spa_shell(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-cache")], Html(state.shell.to_string()))
}

/// Build-directory miss: the shell for route-like paths, 404 for assets.
async fn deep_link(State(state): State<AppState>, uri: Uri) -> Response {
    if is_asset_path(uri.path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    spa_shell(State(state)).await.into_response()
}

fn is_asset_path(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
