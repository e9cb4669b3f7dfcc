//! Rendering engine trait.
//!
//! A renderer fetches a batch of URLs, executes whatever it can (scripts,
//! layout) and returns extracted markdown per URL. Concurrency across the
//! batch is the renderer's business: the pipeline issues one call per pass
//! and waits for the whole set.
//!
//! # Contract
//!
//! `render_many` returns exactly one [`RawRender`] per input URL, in input
//! order. Per-URL problems are reported inside the returned vector; an
//! `Err` means the whole call failed and nothing can be said about any URL.

use async_trait::async_trait;

use crate::error::UpstreamResult;
use crate::types::config::RenderOptions;
use crate::types::render::RawRender;

/// Rendering engine capability.
///
/// # Implementations
///
/// - `RemoteRenderer` - Browser rendering service over HTTP
/// - `HttpRenderer` - Local static-HTML rendering (no JavaScript)
/// - `MockRenderer` - For testing
///
/// # Lifecycle
///
/// The process owns one renderer. It calls [`start`](Renderer::start) once
/// before serving and [`shutdown`](Renderer::shutdown) once on every exit
/// path, including a failed start.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render every URL in `urls`.
    async fn render_many(
        &self,
        urls: &[String],
        options: &RenderOptions,
    ) -> UpstreamResult<Vec<RawRender>>;

    /// Acquire whatever the renderer needs before the first call.
    async fn start(&self) -> UpstreamResult<()> {
        Ok(())
    }

    /// Release renderer resources.
    async fn shutdown(&self) {}

    /// Renderer name (for logging/health).
    fn name(&self) -> &str {
        "unknown"
    }
}
