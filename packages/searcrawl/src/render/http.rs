//! Local static renderer.
//!
//! Fetches pages with plain HTTP and extracts the main content with
//! [`extract_content`](super::extract::extract_content). No JavaScript runs,
//! so single-page apps come back mostly empty; use the remote renderer for
//! those.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::extract::extract_content;
use crate::error::{UpstreamError, UpstreamResult};
use crate::traits::renderer::Renderer;
use crate::types::config::RenderOptions;
use crate::types::render::{RawRender, RenderRecord};

/// Default number of pages fetched at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Renderer that fetches static HTML directly.
pub struct HttpRenderer {
    client: Client,
    max_concurrency: usize,
}

impl HttpRenderer {
    pub fn new(timeout: Duration, max_concurrency: usize) -> UpstreamResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(UpstreamError::http)?;

        Ok(Self {
            client,
            max_concurrency: max_concurrency.max(1),
        })
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn render_one(&self, url: &str, options: &RenderOptions) -> RawRender {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return RawRender::Errored(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return RenderRecord::failure(url, format!("HTTP {}", status)).into();
        }

        let final_url = response.url().to_string();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return RawRender::Errored(e.to_string()),
        };

        let content = extract_content(&body, &final_url, options);
        debug!(
            url = %url,
            kept = content.kept_blocks,
            pruned = content.pruned_blocks,
            "Extracted page content"
        );

        let record = RenderRecord::success(url, content.markdown);
        match content.density_score {
            Some(score) => record.with_density_score(score).into(),
            None => record.into(),
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render_many(
        &self,
        urls: &[String],
        options: &RenderOptions,
    ) -> UpstreamResult<Vec<RawRender>> {
        // `buffered` keeps input order while running up to N fetches at once.
        let results = stream::iter(urls.to_vec())
            .map(|url| async move { self.render_one(&url, options).await })
            .boxed()
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(results)
    }

    fn name(&self) -> &str {
        "http"
    }
}
