//! Retrying batch fetcher.
//!
//! Drives the renderer over a URL batch in at most two passes:
//!
//! - Pass 1 renders the whole batch in one call. Usable results become
//!   blocks, everything else becomes a retry candidate.
//! - Pass 2 (only when there are candidates) renders exactly the candidates,
//!   in their original relative order. Anything still unusable is a
//!   terminal failure.
//!
//! There is no third pass. A renderer call that fails as a whole aborts the
//! fetch with an upstream error; per-URL failures never do.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pipeline::classify::{classify, Disposition, Pass};
use crate::traits::renderer::Renderer;
use crate::types::config::RenderOptions;
use crate::types::render::RawRender;
use crate::types::report::FetchReport;

/// Renders URL batches with a single retry pass.
#[derive(Clone)]
pub struct BatchFetcher {
    renderer: Arc<dyn Renderer>,
    options: RenderOptions,
}

impl BatchFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, options: RenderOptions) -> Self {
        Self { renderer, options }
    }

    /// Fetch every URL, retrying failures once.
    pub async fn fetch(&self, urls: &[String]) -> Result<FetchReport> {
        let mut report = FetchReport::default();
        if urls.is_empty() {
            return Ok(report);
        }

        info!(
            renderer = self.renderer.name(),
            count = urls.len(),
            urls = %urls.join(", "),
            "Starting to crawl URLs"
        );

        let first_pass = self.render_pass(urls).await?;
        let mut retry_urls = Vec::new();

        for (url, raw) in urls.iter().zip(&first_pass) {
            match classify(raw, Pass::First) {
                Disposition::Usable(content) => {
                    info!(url = %url, "Successfully crawled URL");
                    report.push_usable(url, content);
                }
                Disposition::RetryCandidate(reason) => {
                    debug!(url = %url, reason = %reason, "URL first crawl attempt failed");
                    retry_urls.push(url.clone());
                }
                Disposition::TerminalFailure(reason) => {
                    warn!(url = %url, reason = %reason, "URL crawl failed");
                    report.push_failed(url);
                }
            }
        }

        if retry_urls.is_empty() {
            return Ok(report);
        }

        info!(
            count = retry_urls.len(),
            urls = %retry_urls.join(", "),
            "Retrying failed URLs"
        );

        let retry_pass = self.render_pass(&retry_urls).await?;

        for (url, raw) in retry_urls.iter().zip(&retry_pass) {
            match classify(raw, Pass::Retry) {
                Disposition::Usable(content) => {
                    info!(url = %url, "Successfully crawled URL on retry");
                    report.push_usable(url, content);
                }
                Disposition::RetryCandidate(reason) | Disposition::TerminalFailure(reason) => {
                    warn!(url = %url, reason = %reason, "URL second crawl attempt failed");
                    report.push_failed(url);
                }
            }
        }

        Ok(report)
    }

    /// One renderer call, aligned to exactly one result per URL.
    async fn render_pass(&self, urls: &[String]) -> Result<Vec<RawRender>> {
        let results = self.renderer.render_many(urls, &self.options).await?;
        Ok(align_results(urls, results))
    }
}

/// Pad or truncate renderer output to one result per input URL.
///
/// Positions the renderer left out read as `Missing`.
fn align_results(urls: &[String], mut results: Vec<RawRender>) -> Vec<RawRender> {
    if results.len() != urls.len() {
        warn!(
            expected = urls.len(),
            received = results.len(),
            "Renderer returned a mismatched number of results"
        );
        results.resize(urls.len(), RawRender::Missing);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::testing::MockRenderer;
    use crate::types::render::RenderRecord;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    fn fetcher(renderer: &MockRenderer) -> BatchFetcher {
        BatchFetcher::new(Arc::new(renderer.clone()), RenderOptions::default())
    }

    #[tokio::test]
    async fn test_all_usable_single_pass() {
        let renderer = MockRenderer::new()
            .with_page("https://a.com", "# A")
            .with_page("https://b.com", "# B");

        let report = fetcher(&renderer)
            .fetch(&urls(&["https://a.com", "https://b.com"]))
            .await
            .unwrap();

        assert_eq!(report.usable_blocks, vec!["# A", "# B"]);
        assert!(report.failed_urls.is_empty());
        assert_eq!(renderer.render_call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_pass_gets_only_failures_in_order() {
        let renderer = MockRenderer::new()
            .with_attempts(
                "https://a.com",
                vec![RawRender::Missing, RenderRecord::success("https://a.com", "A").into()],
            )
            .with_page("https://b.com", "B")
            .with_attempts(
                "https://c.com",
                vec![RenderRecord::failure("https://c.com", "timeout").into()],
            );

        let report = fetcher(&renderer)
            .fetch(&urls(&["https://a.com", "https://b.com", "https://c.com"]))
            .await
            .unwrap();

        assert_eq!(
            renderer.render_calls(),
            vec![
                urls(&["https://a.com", "https://b.com", "https://c.com"]),
                urls(&["https://a.com", "https://c.com"]),
            ]
        );
        // Pass-1 blocks come before pass-2 blocks.
        assert_eq!(report.usable_blocks, vec!["B", "A"]);
        assert_eq!(report.succeeded_urls, urls(&["https://b.com", "https://a.com"]));
        assert_eq!(report.failed_urls, urls(&["https://c.com"]));
    }

    #[tokio::test]
    async fn test_never_more_than_two_passes() {
        let renderer = MockRenderer::new();

        let report = fetcher(&renderer)
            .fetch(&urls(&["https://gone.com"]))
            .await
            .unwrap();

        assert_eq!(renderer.render_call_count(), 2);
        assert_eq!(report.failed_urls, urls(&["https://gone.com"]));
        assert!(!report.has_usable());
    }

    #[tokio::test]
    async fn test_every_url_accounted_once() {
        let renderer = MockRenderer::new()
            .with_page("https://a.com", "A")
            .with_attempts(
                "https://b.com",
                vec![RawRender::Errored("decode".into()), RawRender::Missing],
            )
            .with_attempts(
                "https://c.com",
                vec![RenderRecord::default().into(), RenderRecord::success("https://c.com", "C").into()],
            );
        let batch = urls(&["https://a.com", "https://b.com", "https://c.com"]);

        let report = fetcher(&renderer).fetch(&batch).await.unwrap();

        let mut seen: Vec<String> = report
            .succeeded_urls
            .iter()
            .chain(&report.failed_urls)
            .cloned()
            .collect();
        seen.sort();
        assert_eq!(seen, batch);
        assert_eq!(report.success_count(), 2);
    }

    #[tokio::test]
    async fn test_short_renderer_output_reads_as_missing() {
        let renderer = MockRenderer::new()
            .with_page("https://a.com", "A")
            .with_page("https://b.com", "B")
            .truncate_output(1);

        let report = fetcher(&renderer)
            .fetch(&urls(&["https://a.com", "https://b.com"]))
            .await
            .unwrap();

        assert_eq!(report.usable_blocks, vec!["A", "B"]);
        // b.com was dropped on pass 1, retried alone, and came back on pass 2.
        assert_eq!(report.succeeded_urls, urls(&["https://a.com", "https://b.com"]));
        assert_eq!(renderer.render_calls()[1], urls(&["https://b.com"]));
    }

    #[tokio::test]
    async fn test_duplicate_url_accounted_per_position() {
        let renderer = MockRenderer::new().with_attempts(
            "https://a.com",
            vec![
                RenderRecord::success("https://a.com", "A").into(),
                RawRender::Missing,
                RawRender::Missing,
            ],
        );

        let report = fetcher(&renderer)
            .fetch(&urls(&["https://a.com", "https://a.com"]))
            .await
            .unwrap();

        assert_eq!(report.usable_blocks, vec!["A"]);
        assert_eq!(report.succeeded_urls, urls(&["https://a.com"]));
        assert_eq!(report.failed_urls, urls(&["https://a.com"]));
        assert_eq!(renderer.render_calls()[1], urls(&["https://a.com"]));
    }

    #[tokio::test]
    async fn test_wholesale_failure_propagates() {
        let renderer = MockRenderer::new().failing("renderer offline");

        let err = fetcher(&renderer)
            .fetch(&urls(&["https://a.com"]))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Upstream(_)));
        assert!(err.to_string().contains("renderer offline"));
    }

    #[tokio::test]
    async fn test_wholesale_failure_on_retry_pass_propagates() {
        let renderer = MockRenderer::new()
            .with_page("https://a.com", "A")
            .fail_on_call(2);

        let result = fetcher(&renderer)
            .fetch(&urls(&["https://a.com", "https://b.com"]))
            .await;

        assert!(matches!(result, Err(PipelineError::Upstream(_))));
        assert_eq!(renderer.render_call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_renderer() {
        let renderer = MockRenderer::new();

        let report = fetcher(&renderer).fetch(&[]).await.unwrap();

        assert_eq!(report, FetchReport::default());
        assert_eq!(renderer.render_call_count(), 0);
    }

    #[test]
    fn test_align_results_pads_and_truncates() {
        let batch = urls(&["a", "b"]);

        let padded = align_results(&batch, vec![RawRender::Errored("x".into())]);
        assert_eq!(padded, vec![RawRender::Errored("x".into()), RawRender::Missing]);

        let truncated = align_results(
            &batch,
            vec![RawRender::Missing, RawRender::Missing, RawRender::Errored("extra".into())],
        );
        assert_eq!(truncated.len(), 2);
    }
}
