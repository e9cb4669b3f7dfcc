//! Request types for the pipeline entry points.

use serde::{Deserialize, Serialize};

/// A search-then-crawl request.
///
/// Missing fields fall back to the pipeline's configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    #[serde(default)]
    pub limit: Option<usize>,

    /// Comma-separated engine ids
    #[serde(default)]
    pub disabled_engines: Option<String>,

    /// Comma-separated engine ids
    #[serde(default)]
    pub enabled_engines: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            disabled_engines: None,
            enabled_engines: None,
        }
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the disabled engine list.
    pub fn with_disabled_engines(mut self, engines: impl Into<String>) -> Self {
        self.disabled_engines = Some(engines.into());
        self
    }

    /// Set the enabled engine list.
    pub fn with_enabled_engines(mut self, engines: impl Into<String>) -> Self {
        self.enabled_engines = Some(engines.into());
        self
    }
}

/// A direct crawl of caller-supplied URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub urls: Vec<String>,

    /// Free-form instruction, typically the originating query
    pub instruction: String,
}

impl CrawlRequest {
    pub fn new(urls: Vec<String>, instruction: impl Into<String>) -> Self {
        Self {
            urls,
            instruction: instruction.into(),
        }
    }
}
