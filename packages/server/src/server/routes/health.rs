use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub renderer: String,
    pub search_backend: String,
    pub version: &'static str,
}

/// Health check endpoint
///
/// Reports the active renderer, the search backend and the service
/// version. The renderer was checked at startup; this endpoint does not call
/// it again.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        renderer: state.pipeline.renderer_name().to_string(),
        search_backend: state.pipeline.searcher_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
