//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline without
//! a running search backend or rendering service.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{UpstreamError, UpstreamResult};
use crate::traits::renderer::Renderer;
use crate::traits::searcher::{SearchBackend, SearchHit};
use crate::types::config::{EngineFilter, RenderOptions};
use crate::types::render::{RawRender, RenderRecord};

/// Mock search backend.
///
/// Returns canned hits per query; unknown queries return no hits.
///
/// # Example
///
/// ```rust
/// use searcrawl::testing::MockSearchBackend;
///
/// let searcher = MockSearchBackend::new()
///     .with_urls("rust", &["https://rust-lang.org", "https://docs.rs"]);
/// ```
#[derive(Default, Clone)]
pub struct MockSearchBackend {
    /// Canned hits indexed by query
    hits: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,

    /// When set, every call fails with this message
    failure: Arc<RwLock<Option<String>>>,

    /// Track calls for verification
    calls: Arc<RwLock<Vec<(String, usize, EngineFilter)>>>,
}

impl MockSearchBackend {
    /// Create a new empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add hits for a query (builder pattern).
    pub fn with_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.write().unwrap().insert(query.into(), hits);
        self
    }

    /// Add one hit per URL for a query (builder pattern).
    pub fn with_urls(self, query: impl Into<String>, urls: &[&str]) -> Self {
        let hits = urls.iter().map(|url| SearchHit::new(*url)).collect();
        self.with_hits(query, hits)
    }

    /// Make every call fail as an upstream outage.
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some(message.into());
        self
    }

    /// Get the `(query, limit, engines)` of every call.
    pub fn calls(&self) -> Vec<(String, usize, EngineFilter)> {
        self.calls.read().unwrap().clone()
    }

    /// Get the number of search calls.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        engines: &EngineFilter,
    ) -> UpstreamResult<Vec<SearchHit>> {
        self.calls
            .write()
            .unwrap()
            .push((query.to_string(), limit, engines.clone()));

        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(UpstreamError::Status {
                status: 503,
                body: message,
            });
        }

        Ok(self
            .hits
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock renderer.
///
/// Each URL has a script of attempts. Every render of that URL consumes the
/// next attempt; the last attempt repeats once the script runs out. URLs
/// with no script render as [`RawRender::Missing`].
///
/// # Example
///
/// ```rust
/// use searcrawl::testing::MockRenderer;
/// use searcrawl::{RawRender, RenderRecord};
///
/// let renderer = MockRenderer::new()
///     .with_page("https://a.com", "# A")
///     .with_attempts(
///         "https://b.com",
///         vec![RawRender::Missing, RenderRecord::success("https://b.com", "# B").into()],
///     );
/// ```
#[derive(Default, Clone)]
pub struct MockRenderer {
    /// Scripted attempts indexed by URL
    scripts: Arc<RwLock<HashMap<String, VecDeque<RawRender>>>>,

    /// When set, every call fails with this message
    failure: Arc<RwLock<Option<String>>>,

    /// 1-based call number that fails wholesale
    fail_on_call: Arc<RwLock<Option<usize>>>,

    /// Cap on outcomes returned per call (contract violation)
    output_limit: Arc<RwLock<Option<usize>>>,

    /// When set, `start` fails with this message
    start_failure: Arc<RwLock<Option<String>>>,

    /// Delay before each render call answers
    latency: Arc<RwLock<Option<Duration>>>,

    /// Track render calls for verification
    render_calls: Arc<RwLock<Vec<Vec<String>>>>,

    start_calls: Arc<AtomicUsize>,
    shutdown_calls: Arc<AtomicUsize>,
}

impl MockRenderer {
    /// Create a new mock renderer with no scripted pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a URL that always renders successfully (builder pattern).
    pub fn with_page(self, url: impl Into<String>, markdown: impl Into<String>) -> Self {
        let url = url.into();
        let record = RenderRecord::success(url.clone(), markdown);
        self.with_attempts(url, vec![record.into()])
    }

    /// Script successive attempts for a URL (builder pattern).
    pub fn with_attempts(self, url: impl Into<String>, attempts: Vec<RawRender>) -> Self {
        self.scripts
            .write()
            .unwrap()
            .insert(url.into(), attempts.into());
        self
    }

    /// Make every render call fail as an upstream outage.
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some(message.into());
        self
    }

    /// Make only the given render call (1-based) fail as an upstream outage.
    pub fn fail_on_call(self, call: usize) -> Self {
        *self.fail_on_call.write().unwrap() = Some(call);
        self
    }

    /// Return at most `limit` outcomes per call.
    pub fn truncate_output(self, limit: usize) -> Self {
        *self.output_limit.write().unwrap() = Some(limit);
        self
    }

    /// Make `start` fail.
    pub fn failing_start(self, message: impl Into<String>) -> Self {
        *self.start_failure.write().unwrap() = Some(message.into());
        self
    }

    /// Delay every render call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.write().unwrap() = Some(latency);
        self
    }

    /// Get the URL batch of every render call.
    pub fn render_calls(&self) -> Vec<Vec<String>> {
        self.render_calls.read().unwrap().clone()
    }

    /// Get the number of render calls.
    pub fn render_call_count(&self) -> usize {
        self.render_calls.read().unwrap().len()
    }

    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    fn next_attempt(&self, url: &str) -> RawRender {
        let mut scripts = self.scripts.write().unwrap();
        match scripts.get_mut(url) {
            Some(attempts) if attempts.len() > 1 => {
                attempts.pop_front().unwrap_or(RawRender::Missing)
            }
            Some(attempts) => attempts.front().cloned().unwrap_or(RawRender::Missing),
            None => RawRender::Missing,
        }
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render_many(
        &self,
        urls: &[String],
        _options: &RenderOptions,
    ) -> UpstreamResult<Vec<RawRender>> {
        let call_number = {
            let mut calls = self.render_calls.write().unwrap();
            calls.push(urls.to_vec());
            calls.len()
        };

        let latency = *self.latency.read().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(UpstreamError::Status {
                status: 503,
                body: message,
            });
        }
        if *self.fail_on_call.read().unwrap() == Some(call_number) {
            return Err(UpstreamError::Status {
                status: 503,
                body: format!("render call {call_number} failed"),
            });
        }

        let mut outcomes: Vec<RawRender> = urls.iter().map(|url| self.next_attempt(url)).collect();
        if let Some(limit) = *self.output_limit.read().unwrap() {
            outcomes.truncate(limit);
        }

        Ok(outcomes)
    }

    async fn start(&self) -> UpstreamResult<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match self.start_failure.read().unwrap().clone() {
            Some(message) => Err(UpstreamError::Status {
                status: 503,
                body: message,
            }),
            None => Ok(()),
        }
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "mock"
    }
}
