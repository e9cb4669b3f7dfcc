//! Search-and-extract pipeline.
//!
//! ```text
//! query -> search -> URLs -> fetch (pass 1, pass 2) -> reduce -> AggregatedResult
//! ```
//!
//! The [`Pipeline`] owns handles to both collaborators and the configured
//! defaults. It holds no per-request state, so one instance serves every
//! request concurrently.

pub mod classify;
pub mod fetch;
pub mod normalize;
pub mod reduce;

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{PipelineError, Result};
use crate::traits::renderer::Renderer;
use crate::traits::searcher::SearchBackend;
use crate::types::config::{EngineFilter, PipelineConfig};
use crate::types::report::AggregatedResult;
use crate::types::request::{CrawlRequest, SearchRequest};

pub use classify::{classify, inspect, Disposition, Pass};
pub use fetch::BatchFetcher;
pub use normalize::{markdown_to_text, normalize, strip_markdown_syntax};
pub use reduce::{reduce, SEPARATOR};

/// Query orchestrator.
///
/// # Example
///
/// ```rust,ignore
/// use searcrawl::{Pipeline, PipelineConfig, SearchRequest};
///
/// let pipeline = Pipeline::new(searcher, renderer, PipelineConfig::default());
/// let result = pipeline.search(&SearchRequest::new("rust async").with_limit(3)).await?;
/// println!("{} pages, {} failed", result.success_count, result.failed_urls.len());
/// ```
pub struct Pipeline {
    searcher: Arc<dyn SearchBackend>,
    fetcher: BatchFetcher,
    renderer_name: String,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        searcher: Arc<dyn SearchBackend>,
        renderer: Arc<dyn Renderer>,
        config: PipelineConfig,
    ) -> Self {
        let renderer_name = renderer.name().to_string();
        let fetcher = BatchFetcher::new(renderer, config.render.clone());

        Self {
            searcher,
            fetcher,
            renderer_name,
            config,
        }
    }

    pub fn renderer_name(&self) -> &str {
        &self.renderer_name
    }

    pub fn searcher_name(&self) -> &str {
        self.searcher.name()
    }

    /// Search, then fetch and reduce the result URLs.
    pub async fn search(&self, request: &SearchRequest) -> Result<AggregatedResult> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(PipelineError::invalid("query must not be blank"));
        }

        let limit = request.limit.unwrap_or(self.config.default_limit);
        if limit == 0 {
            return Err(PipelineError::invalid("limit must be at least 1"));
        }

        let engines = self.engine_filter(request);

        info!(
            query = %query,
            limit,
            backend = self.searcher.name(),
            "Searching"
        );

        let hits = self.searcher.search(query, limit, &engines).await?;
        if hits.is_empty() {
            warn!(query = %query, "No search results found");
            return Err(PipelineError::NoResults);
        }

        let urls: Vec<String> = hits
            .iter()
            .take(limit)
            .filter_map(|hit| hit.usable_url())
            .map(str::to_string)
            .collect();

        if urls.is_empty() {
            warn!(query = %query, hits = hits.len(), "No valid URLs in search results");
            return Err(PipelineError::NoValidUrls);
        }

        info!(count = urls.len(), "Search returned URLs");

        self.fetch_and_reduce(&urls).await
    }

    /// Fetch and reduce a caller-supplied batch.
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<AggregatedResult> {
        if request.urls.is_empty() {
            return Err(PipelineError::invalid("urls must not be empty"));
        }

        info!(
            count = request.urls.len(),
            instruction = %request.instruction,
            "Crawling URLs"
        );

        self.fetch_and_reduce(&request.urls).await
    }

    async fn fetch_and_reduce(&self, urls: &[String]) -> Result<AggregatedResult> {
        let report = self.fetcher.fetch(urls).await?;

        match reduce(report) {
            Ok(result) => {
                info!(
                    success_count = result.success_count,
                    failed_count = result.failed_urls.len(),
                    "Crawl completed"
                );
                Ok(result)
            }
            Err(err) => {
                if let PipelineError::AllFetchesFailed { failed_urls } = &err {
                    error!(failed_urls = ?failed_urls, "All URL crawls failed");
                }
                Err(err)
            }
        }
    }

    /// Request engine lists, falling back to the configured defaults per list.
    fn engine_filter(&self, request: &SearchRequest) -> EngineFilter {
        let defaults = &self.config.engines;
        let disabled = request
            .disabled_engines
            .clone()
            .unwrap_or_else(|| defaults.disabled_csv());
        let enabled = request
            .enabled_engines
            .clone()
            .unwrap_or_else(|| defaults.enabled_csv());

        EngineFilter::from_csv(&disabled, &enabled)
    }
}
