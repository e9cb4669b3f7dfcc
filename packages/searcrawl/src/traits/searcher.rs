//! Search backend trait.
//!
//! The pipeline needs exactly one thing from a search backend: a ranked
//! list of hits for a query. Hits may lack a URL; the orchestrator drops
//! those.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamResult;
use crate::types::config::EngineFilter;

/// One ranked search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Snippet/description from the search engine.
    #[serde(default)]
    pub content: Option<String>,

    /// Engine that produced the hit.
    #[serde(default)]
    pub engine: Option<String>,

    #[serde(default)]
    pub score: Option<f64>,
}

impl SearchHit {
    /// Create a hit from a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// A hit with no URL.
    pub fn without_url() -> Self {
        Self::default()
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// URL, if present and non-blank.
    pub fn usable_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// Search backend capability.
///
/// # Implementations
///
/// - `SearxngSearcher` - SearXNG JSON API
/// - `MockSearchBackend` - For testing
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for `query`.
    ///
    /// `limit` is advisory: backends that cannot bound their result set may
    /// return more, and the caller truncates.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        engines: &EngineFilter,
    ) -> UpstreamResult<Vec<SearchHit>>;

    /// Backend name (for logging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_url_rejects_blank() {
        assert_eq!(SearchHit::new("https://a.com").usable_url(), Some("https://a.com"));
        assert_eq!(SearchHit::new("   ").usable_url(), None);
        assert_eq!(SearchHit::without_url().usable_url(), None);
    }

    #[test]
    fn test_hit_deserializes_without_url() {
        let hit: SearchHit = serde_json::from_str(r#"{"title": "answer box"}"#).unwrap();
        assert!(hit.url.is_none());
        assert_eq!(hit.title.as_deref(), Some("answer box"));
    }
}
