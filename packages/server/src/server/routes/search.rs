use axum::{extract::Extension, Json};
use searcrawl::{AggregatedResult, SearchRequest};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Search, then crawl every result URL.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<AggregatedResult>, ApiError> {
    let result = state.pipeline.search(&request).await?;
    Ok(Json(result))
}
