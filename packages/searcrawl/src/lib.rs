//! Self-hosted search-and-extract pipeline.
//!
//! Given a query, ask a search backend for candidate URLs, render every page,
//! retry the failures once as a batch, and reduce whatever came back into a
//! single block of plain prose with success/failure accounting.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use searcrawl::{HttpRenderer, Pipeline, PipelineConfig, SearchRequest, SearxngConfig, SearxngSearcher};
//!
//! let searcher = Arc::new(SearxngSearcher::new(SearxngConfig::default())?);
//! let renderer = Arc::new(HttpRenderer::new(Duration::from_secs(60), 8)?);
//! let pipeline = Pipeline::new(searcher, renderer, PipelineConfig::default());
//!
//! let result = pipeline.search(&SearchRequest::new("rust ownership").with_limit(3)).await?;
//! println!("{}", result.content);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (SearchBackend, Renderer)
//! - [`types`] - Requests, render results, reports, configuration
//! - [`pipeline`] - Classifier, batch fetcher, normalizer, reducer, orchestrator
//! - [`search`] - SearXNG search backend
//! - [`render`] - Remote browser renderer and local static renderer
//! - [`credentials`] - Rendering service endpoint and token handling
//! - [`testing`] - Mock implementations for testing

pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod search;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use credentials::{ApiToken, RendererEndpoint};
pub use error::{PipelineError, UpstreamError};
pub use pipeline::{
    classify::{classify, inspect, Disposition, Pass},
    fetch::BatchFetcher,
    normalize::{markdown_to_text, normalize, strip_markdown_syntax},
    reduce::{reduce, SEPARATOR},
    Pipeline,
};
pub use render::{HttpRenderer, RemoteRenderer};
pub use search::{SearxngConfig, SearxngSearcher};
pub use traits::{
    renderer::Renderer,
    searcher::{SearchBackend, SearchHit},
};
pub use types::{
    config::{CacheMode, EngineFilter, PipelineConfig, RenderOptions},
    render::{RawRender, RenderOutcome, RenderRecord, UnusableReason},
    report::{AggregatedResult, FetchReport},
    request::{CrawlRequest, SearchRequest},
};
