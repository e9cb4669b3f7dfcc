//! Configuration types - pipeline defaults and render options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default content-density threshold for the render-side content filter.
pub const DEFAULT_CONTENT_DENSITY_THRESHOLD: f32 = 0.6;

/// Default minimum word count for a content block to be kept.
pub const DEFAULT_MIN_WORD_COUNT: usize = 10;

/// Default number of search results to fetch.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Engines disabled unless the request says otherwise.
pub const DEFAULT_DISABLED_ENGINES: &str = "wikipedia__general,currency__general,wikidata__general,\
duckduckgo__general,google__general,lingva__general,qwant__general,startpage__general,\
dictzone__general,mymemory translated__general,brave__general";

/// Engines enabled unless the request says otherwise.
pub const DEFAULT_ENABLED_ENGINES: &str = "baidu__general";

/// Tags whose content never reaches the rendered markdown.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &["img", "header", "footer", "iframe", "nav"];

/// Search engine allow/deny lists, as SearXNG engine ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFilter {
    pub disabled: Vec<String>,
    pub enabled: Vec<String>,
}

impl EngineFilter {
    /// Build from comma-separated engine id lists.
    pub fn from_csv(disabled: &str, enabled: &str) -> Self {
        Self {
            disabled: split_csv(disabled),
            enabled: split_csv(enabled),
        }
    }

    /// Disabled engines as a comma-separated list.
    pub fn disabled_csv(&self) -> String {
        self.disabled.join(",")
    }

    /// Enabled engines as a comma-separated list.
    pub fn enabled_csv(&self) -> String {
        self.enabled.join(",")
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Renderer cache behaviour. The pipeline always asks for `Bypass`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    Enabled,
    Disabled,
    ReadOnly,
    WriteOnly,
    #[default]
    Bypass,
}

/// Options passed to every `render_many` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Drop links that point to other hosts
    pub exclude_external_links: bool,

    /// Remove modal/overlay/cookie-banner elements
    pub remove_overlays: bool,

    /// Tag names whose subtrees are skipped entirely
    pub excluded_tags: BTreeSet<String>,

    /// Render the content of embedded frames as part of the page
    pub process_embedded_frames: bool,

    /// Blocks scoring below this are pruned (0.0-1.0)
    pub content_density_threshold: f32,

    /// Blocks with fewer words are pruned
    pub min_word_count: usize,

    pub cache_mode: CacheMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            exclude_external_links: true,
            remove_overlays: true,
            excluded_tags: DEFAULT_EXCLUDED_TAGS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            process_embedded_frames: true,
            content_density_threshold: DEFAULT_CONTENT_DENSITY_THRESHOLD,
            min_word_count: DEFAULT_MIN_WORD_COUNT,
            cache_mode: CacheMode::Bypass,
        }
    }
}

impl RenderOptions {
    /// Set the content-density threshold.
    pub fn with_density_threshold(mut self, threshold: f32) -> Self {
        self.content_density_threshold = threshold;
        self
    }

    /// Set the minimum word count.
    pub fn with_min_word_count(mut self, count: usize) -> Self {
        self.min_word_count = count;
        self
    }

    /// Check whether a tag name is excluded (case-insensitive).
    pub fn is_excluded_tag(&self, name: &str) -> bool {
        self.excluded_tags.contains(&name.to_ascii_lowercase())
    }
}

/// Values the pipeline consumes from the surrounding configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Result limit applied when a search request has none
    pub default_limit: usize,

    /// Engine filter applied when a search request has none
    pub engines: EngineFilter,

    pub render: RenderOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
            engines: EngineFilter::from_csv(DEFAULT_DISABLED_ENGINES, DEFAULT_ENABLED_ENGINES),
            render: RenderOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the default search limit.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the default engine filter.
    pub fn with_engines(mut self, engines: EngineFilter) -> Self {
        self.engines = engines;
        self
    }

    /// Set the render options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_filter_csv_round_trip() {
        let filter = EngineFilter::from_csv(" google__general, ,brave__general", "baidu__general");

        assert_eq!(filter.disabled, vec!["google__general", "brave__general"]);
        assert_eq!(filter.disabled_csv(), "google__general,brave__general");
        assert_eq!(filter.enabled_csv(), "baidu__general");
    }

    #[test]
    fn test_default_engines_keep_names_with_spaces() {
        let config = PipelineConfig::default();
        assert!(config
            .engines
            .disabled
            .contains(&"mymemory translated__general".to_string()));
        assert_eq!(config.engines.disabled.len(), 11);
    }

    #[test]
    fn test_render_option_defaults() {
        let options = RenderOptions::default();

        assert!(options.exclude_external_links);
        assert!(options.remove_overlays);
        assert!(options.process_embedded_frames);
        assert_eq!(options.content_density_threshold, 0.6);
        assert_eq!(options.min_word_count, 10);
        assert_eq!(options.cache_mode, CacheMode::Bypass);
        assert!(options.is_excluded_tag("NAV"));
        assert!(!options.is_excluded_tag("p"));
    }
}
