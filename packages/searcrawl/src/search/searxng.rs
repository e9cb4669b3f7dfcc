//! SearXNG search backend.
//!
//! Talks to a self-hosted SearXNG instance through its JSON output format.
//! Engine selection is carried in the preferences cookie, the query itself
//! as a multipart form.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{UpstreamError, UpstreamResult};
use crate::traits::searcher::{SearchBackend, SearchHit};
use crate::types::config::EngineFilter;

const USER_AGENT_VALUE: &str = concat!("searcrawl/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the SearXNG instance lives and what to ask it for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearxngConfig {
    pub host: String,
    pub port: u16,
    /// Path of the search endpoint, e.g. `/search`
    pub base_path: String,
    /// SearXNG language code (`auto`, `en`, `zh`, ...)
    pub language: String,
}

impl Default for SearxngConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            base_path: "/search".to_string(),
            language: "auto".to_string(),
        }
    }
}

impl SearxngConfig {
    /// Full URL of the search endpoint.
    pub fn endpoint(&self) -> String {
        let path = if self.base_path.starts_with('/') {
            self.base_path.clone()
        } else {
            format!("/{}", self.base_path)
        };
        format!("http://{}:{}{}", self.host, self.port, path)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// SearXNG-backed [`SearchBackend`].
///
/// # Example
///
/// ```rust,ignore
/// use searcrawl::{SearxngConfig, SearxngSearcher};
///
/// let searcher = SearxngSearcher::new(SearxngConfig::default())?;
/// ```
pub struct SearxngSearcher {
    client: Client,
    config: SearxngConfig,
}

impl SearxngSearcher {
    pub fn new(config: SearxngConfig) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(UpstreamError::http)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SearxngConfig {
        &self.config
    }

    fn form(&self, query: &str) -> Form {
        Form::new()
            .text("q", query.to_string())
            .text("format", "json")
            .text("language", self.config.language.clone())
            .text("time_range", "week")
            .text("safesearch", "2")
            .text("pageno", "1")
            .text("category_general", "1")
    }
}

/// Preferences cookie carrying the engine lists.
pub(crate) fn preferences_cookie(engines: &EngineFilter) -> String {
    format!(
        "disabled_engines={};enabled_engines={};method=POST",
        engines.disabled_csv(),
        engines.enabled_csv()
    )
}

/// Parse a SearXNG JSON response body.
pub(crate) fn parse_response(body: &str) -> UpstreamResult<Vec<SearchHit>> {
    serde_json::from_str::<SearchResponse>(body)
        .map(|response| response.results)
        .map_err(|e| UpstreamError::MalformedResponse(format!("SearXNG response: {}", e)))
}

#[async_trait]
impl SearchBackend for SearxngSearcher {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        engines: &EngineFilter,
    ) -> UpstreamResult<Vec<SearchHit>> {
        info!(query = %query, limit, "Sending SearXNG search request");

        let response = self
            .client
            .post(self.config.endpoint())
            .header(COOKIE, preferences_cookie(engines))
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "*/*")
            .multipart(self.form(query))
            .send()
            .await
            .map_err(UpstreamError::http)?;

        let status = response.status();
        let body = response.text().await.map_err(UpstreamError::http)?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let hits = parse_response(&body)?;
        debug!(count = hits.len(), "SearXNG returned results");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "searxng"
    }
}
