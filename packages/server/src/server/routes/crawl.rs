use axum::{extract::Extension, Json};
use searcrawl::{AggregatedResult, CrawlRequest};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Crawl caller-supplied URLs.
pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<AggregatedResult>, ApiError> {
    let result = state.pipeline.crawl(&request).await?;
    Ok(Json(result))
}
