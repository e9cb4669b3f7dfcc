//! Remote browser renderer.
//!
//! Client for a rendering service exposing a crawl4ai-compatible HTTP API:
//! `GET /health` and `POST /crawl` with a batch of URLs plus browser and
//! crawler configuration. The service runs a headless browser, so this is
//! the renderer to use for JavaScript-heavy pages.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::credentials::RendererEndpoint;
use crate::error::{UpstreamError, UpstreamResult};
use crate::traits::renderer::Renderer;
use crate::types::config::RenderOptions;
use crate::types::render::{RawRender, RenderRecord};

/// Renderer backed by a remote browser rendering service.
///
/// # Example
///
/// ```rust,ignore
/// use searcrawl::{RemoteRenderer, RendererEndpoint};
/// use std::time::Duration;
///
/// let endpoint = RendererEndpoint::new("http://localhost:11235");
/// let renderer = RemoteRenderer::new(endpoint, Duration::from_secs(60))?;
/// renderer.start().await?;
/// ```
pub struct RemoteRenderer {
    client: Client,
    endpoint: RendererEndpoint,
}

#[derive(Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    success: Option<bool>,
    results: Vec<Value>,
}

/// One per-URL result as the service reports it.
#[derive(Deserialize)]
struct WireResult {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    markdown: Option<WireMarkdown>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Markdown is either a plain string or the generator's full output.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireMarkdown {
    Text(String),
    Generated {
        #[serde(default)]
        fit_markdown: Option<String>,
        #[serde(default)]
        raw_markdown: Option<String>,
    },
}

impl WireMarkdown {
    /// The filtered markdown. Raw markdown is never used as a fallback since
    /// it still carries the boilerplate the filter removed.
    fn into_content(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Generated { fit_markdown, .. } => fit_markdown,
        }
    }
}

impl RemoteRenderer {
    pub fn new(endpoint: RendererEndpoint, timeout: Duration) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UpstreamError::http)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &RendererEndpoint {
        &self.endpoint
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.endpoint.token {
            Some(token) => request.header("Authorization", token.bearer()),
            None => request,
        }
    }
}

/// Request body for `POST /crawl`.
pub(crate) fn crawl_payload(urls: &[String], options: &RenderOptions) -> Value {
    let excluded_tags: Vec<&str> = options.excluded_tags.iter().map(String::as_str).collect();

    json!({
        "urls": urls,
        "browser_config": {
            "type": "BrowserConfig",
            "params": { "headless": true, "verbose": false }
        },
        "crawler_config": {
            "type": "CrawlerRunConfig",
            "params": {
                "word_count_threshold": options.min_word_count,
                "exclude_external_links": options.exclude_external_links,
                "remove_overlay_elements": options.remove_overlays,
                "excluded_tags": excluded_tags,
                "process_iframes": options.process_embedded_frames,
                "cache_mode": options.cache_mode,
                "markdown_generator": {
                    "type": "DefaultMarkdownGenerator",
                    "params": {
                        "content_filter": {
                            "type": "PruningContentFilter",
                            "params": { "threshold": options.content_density_threshold }
                        },
                        "options": {
                            "type": "dict",
                            "value": {
                                "ignore_links": true,
                                "ignore_images": true,
                                "escape_html": false
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Decode one result, never failing: decode errors become `Errored`.
fn decode_result(value: Value) -> RawRender {
    if value.is_null() {
        return RawRender::Missing;
    }

    match serde_json::from_value::<WireResult>(value) {
        Ok(wire) => RawRender::Record(RenderRecord {
            url: wire.url,
            success: wire.success,
            markdown: wire.markdown.and_then(WireMarkdown::into_content),
            density_score: None,
            error_message: wire.error_message,
        }),
        Err(e) => RawRender::Errored(e.to_string()),
    }
}

fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Put each result back at the position of the URL it belongs to.
///
/// A result is matched to the first not-yet-filled input with the same URL.
/// Results without a URL (or with one that matches nothing, e.g. after a
/// redirect) fall back to their own position if it is still free. Inputs
/// left without a result are `Missing`; results left without a slot are
/// dropped.
pub(crate) fn match_results(urls: &[String], results: Vec<Value>) -> Vec<RawRender> {
    let mut slots: Vec<Option<RawRender>> = vec![None; urls.len()];
    let mut unplaced = Vec::new();

    for (index, value) in results.into_iter().enumerate() {
        let result_url = value
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string);
        let raw = decode_result(value);

        let slot = result_url.as_deref().and_then(|result_url| {
            urls.iter()
                .enumerate()
                .position(|(i, url)| slots[i].is_none() && same_url(url, result_url))
        });

        match slot {
            Some(i) => slots[i] = Some(raw),
            None => unplaced.push((index, raw)),
        }
    }

    for (index, raw) in unplaced {
        match slots.get_mut(index) {
            Some(slot) if slot.is_none() => *slot = Some(raw),
            _ => warn!(position = index, "Dropping render result with no matching URL"),
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(RawRender::Missing))
        .collect()
}

#[async_trait]
impl Renderer for RemoteRenderer {
    async fn render_many(
        &self,
        urls: &[String],
        options: &RenderOptions,
    ) -> UpstreamResult<Vec<RawRender>> {
        debug!(count = urls.len(), "Sending batch to rendering service");

        let response = self
            .authorize(self.client.post(self.endpoint.url("/crawl")))
            .json(&crawl_payload(urls, options))
            .send()
            .await
            .map_err(UpstreamError::http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: CrawlResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedResponse(format!("crawl response: {}", e)))?;

        if envelope.success == Some(false) {
            warn!("Rendering service reported batch failure");
        }

        Ok(match_results(urls, envelope.results))
    }

    async fn start(&self) -> UpstreamResult<()> {
        let response = self
            .authorize(self.client.get(self.endpoint.url("/health")))
            .send()
            .await
            .map_err(UpstreamError::http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(base_url = %self.endpoint.base_url, "Rendering service is healthy");
        Ok(())
    }

    async fn shutdown(&self) {
        info!(base_url = %self.endpoint.base_url, "Detached from rendering service");
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_payload_carries_render_options() {
        let payload = crawl_payload(&urls(&["https://a.com"]), &RenderOptions::default());
        let params = &payload["crawler_config"]["params"];

        assert_eq!(payload["urls"][0], "https://a.com");
        assert_eq!(params["word_count_threshold"], 10);
        assert_eq!(params["cache_mode"], "bypass");
        assert_eq!(params["exclude_external_links"], true);
        assert_eq!(params["process_iframes"], true);
        assert_eq!(
            params["excluded_tags"],
            json!(["footer", "header", "iframe", "img", "nav"])
        );

        let generator = &params["markdown_generator"]["params"];
        let threshold = generator["content_filter"]["params"]["threshold"]
            .as_f64()
            .unwrap();
        assert!((threshold - 0.6).abs() < 1e-6);
        assert_eq!(generator["options"]["value"]["ignore_links"], true);
    }

    #[test]
    fn test_decode_generated_markdown_uses_fit() {
        let raw = decode_result(json!({
            "url": "https://a.com",
            "success": true,
            "markdown": { "raw_markdown": "# Nav\n# A", "fit_markdown": "# A" }
        }));

        match raw {
            RawRender::Record(record) => {
                assert_eq!(record.markdown.as_deref(), Some("# A"));
                assert_eq!(record.success, Some(true));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_decode_string_markdown_and_missing_status() {
        let raw = decode_result(json!({ "url": "https://a.com", "markdown": "# A" }));

        assert_eq!(
            raw,
            RawRender::Record(RenderRecord {
                url: Some("https://a.com".to_string()),
                markdown: Some("# A".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_decode_bad_shape_is_errored() {
        assert!(matches!(
            decode_result(json!({ "success": "yes" })),
            RawRender::Errored(_)
        ));
        assert_eq!(decode_result(Value::Null), RawRender::Missing);
    }

    #[test]
    fn test_match_results_by_url_out_of_order() {
        let batch = urls(&["https://a.com", "https://b.com"]);
        let results = vec![
            json!({ "url": "https://b.com/", "success": true, "markdown": "B" }),
            json!({ "url": "https://a.com", "success": true, "markdown": "A" }),
        ];

        let matched = match_results(&batch, results);

        assert_eq!(
            matched,
            vec![
                RenderRecord::success("https://a.com", "A").into(),
                RenderRecord::success("https://b.com/", "B").into(),
            ]
        );
    }

    #[test]
    fn test_match_results_duplicates_and_gaps() {
        let batch = urls(&["https://a.com", "https://a.com", "https://c.com"]);
        let results = vec![
            json!({ "url": "https://a.com", "success": true, "markdown": "A1" }),
            json!({ "url": "https://a.com", "success": false }),
        ];

        let matched = match_results(&batch, results);

        assert_eq!(matched.len(), 3);
        assert_eq!(matched[0], RenderRecord::success("https://a.com", "A1").into());
        assert!(matches!(&matched[1], RawRender::Record(r) if r.success == Some(false)));
        assert_eq!(matched[2], RawRender::Missing);
    }

    #[test]
    fn test_match_results_positional_fallback() {
        let batch = urls(&["https://a.com", "https://b.com"]);
        let results = vec![
            json!({ "url": "https://a.com", "success": true, "markdown": "A" }),
            json!({ "url": "https://www.b.com/landing", "success": true, "markdown": "B" }),
            json!({ "url": "https://extra.com", "success": true, "markdown": "X" }),
        ];

        let matched = match_results(&batch, results);

        assert_eq!(matched.len(), 2);
        assert!(matches!(&matched[1], RawRender::Record(r) if r.markdown.as_deref() == Some("B")));
    }

    fn renderer_for(server: &MockServer) -> RemoteRenderer {
        let endpoint = RendererEndpoint::new(server.uri()).with_token("c4ai-secret");
        RemoteRenderer::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_render_many_posts_batch_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/crawl"))
            .and(header("authorization", "Bearer c4ai-secret"))
            .and(body_partial_json(json!({
                "urls": ["https://a.com", "https://b.com"],
                "browser_config": {"type": "BrowserConfig"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "results": [
                    {"url": "https://b.com", "success": false, "error_message": "timeout"},
                    {
                        "url": "https://a.com",
                        "success": true,
                        "markdown": {"raw_markdown": "nav A page", "fit_markdown": "A page"}
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = renderer_for(&server)
            .render_many(&urls(&["https://a.com", "https://b.com"]), &RenderOptions::default())
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                RenderRecord::success("https://a.com", "A page").into(),
                RenderRecord::failure("https://b.com", "timeout").into(),
            ]
        );
    }

    #[tokio::test]
    async fn test_render_many_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/crawl"))
            .respond_with(ResponseTemplate::new(500).set_body_string("browser crashed"))
            .mount(&server)
            .await;

        let err = renderer_for(&server)
            .render_many(&urls(&["https://a.com"]), &RenderOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_render_many_unparseable_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/crawl"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"detail\": \"queued\"}"))
            .mount(&server)
            .await;

        let err = renderer_for(&server)
            .render_many(&urls(&["https://a.com"]), &RenderOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_start_checks_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("authorization", "Bearer c4ai-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        renderer_for(&server).start().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_fails_when_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = renderer_for(&server).start().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 503, .. }));
    }
}
