//! Server dependencies (using traits for testability)
//!
//! Owns the renderer handle for the life of the process. The entry point
//! calls [`ServerDeps::start`] once before serving and
//! [`ServerDeps::shutdown`] once on the way out, whatever the exit path.

use anyhow::{Context, Result};
use searcrawl::{
    HttpRenderer, Pipeline, PipelineConfig, RemoteRenderer, Renderer, RendererEndpoint,
    SearchBackend, SearxngSearcher,
};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// Shared pipeline plus the renderer whose lifecycle the process manages.
#[derive(Clone)]
pub struct ServerDeps {
    pub pipeline: Arc<Pipeline>,
    pub renderer: Arc<dyn Renderer>,
}

impl ServerDeps {
    /// Create new ServerDeps from already-built collaborators
    pub fn new(
        searcher: Arc<dyn SearchBackend>,
        renderer: Arc<dyn Renderer>,
        pipeline_config: PipelineConfig,
    ) -> Self {
        let pipeline = Pipeline::new(searcher, renderer.clone(), pipeline_config);
        Self {
            pipeline: Arc::new(pipeline),
            renderer,
        }
    }

    /// Build the SearXNG searcher and the configured renderer.
    pub fn from_config(config: &Config) -> Result<Self> {
        let searcher = SearxngSearcher::new(config.searxng.clone())
            .context("Failed to create SearXNG client")?;
        let renderer = build_renderer(config)?;

        Ok(Self::new(Arc::new(searcher), renderer, config.pipeline_config()))
    }

    /// Start the renderer. On failure the renderer is already shut down.
    pub async fn start(&self) -> Result<()> {
        info!(renderer = self.renderer.name(), "Starting renderer");

        if let Err(e) = self.renderer.start().await {
            self.renderer.shutdown().await;
            return Err(e).context("Failed to start renderer");
        }
        Ok(())
    }

    pub async fn shutdown(&self) {
        info!(renderer = self.renderer.name(), "Shutting down renderer");
        self.renderer.shutdown().await;
    }
}

fn build_renderer(config: &Config) -> Result<Arc<dyn Renderer>> {
    match &config.renderer_url {
        Some(url) => {
            let mut endpoint = RendererEndpoint::new(url.as_str());
            endpoint.token = config.renderer_token.clone();

            let renderer = RemoteRenderer::new(endpoint, config.render_timeout())
                .context("Failed to create rendering service client")?;
            Ok(Arc::new(renderer))
        }
        None => {
            let renderer = HttpRenderer::new(config.render_timeout(), config.render_concurrency)
                .context("Failed to create HTTP renderer")?;
            Ok(Arc::new(renderer))
        }
    }
}
