use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use searcrawl::types::config::{
    DEFAULT_CONTENT_DENSITY_THRESHOLD, DEFAULT_DISABLED_ENGINES, DEFAULT_ENABLED_ENGINES,
    DEFAULT_MIN_WORD_COUNT, DEFAULT_SEARCH_LIMIT,
};
use searcrawl::{ApiToken, EngineFilter, PipelineConfig, RenderOptions, SearxngConfig};
use serde_json::{json, Value};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub searxng: SearxngConfig,
    pub default_search_limit: usize,
    pub content_filter_threshold: f32,
    pub word_count_threshold: usize,
    pub disabled_engines: String,
    pub enabled_engines: String,
    /// Remote rendering service; the local HTTP renderer is used when unset
    pub renderer_url: Option<String>,
    pub renderer_token: Option<ApiToken>,
    pub render_concurrency: usize,
    pub render_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Self {
            api_host: text("API_HOST", "0.0.0.0"),
            api_port: parse(&lookup, "API_PORT", 3000)?,
            searxng: SearxngConfig {
                host: text("SEARXNG_HOST", "localhost"),
                port: parse(&lookup, "SEARXNG_PORT", 8080)?,
                base_path: text("SEARXNG_BASE_PATH", "/search"),
                language: text("SEARCH_LANGUAGE", "auto"),
            },
            default_search_limit: parse(&lookup, "DEFAULT_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT)?,
            content_filter_threshold: parse(
                &lookup,
                "CONTENT_FILTER_THRESHOLD",
                DEFAULT_CONTENT_DENSITY_THRESHOLD,
            )?,
            word_count_threshold: parse(&lookup, "WORD_COUNT_THRESHOLD", DEFAULT_MIN_WORD_COUNT)?,
            disabled_engines: text("DISABLED_ENGINES", DEFAULT_DISABLED_ENGINES),
            enabled_engines: text("ENABLED_ENGINES", DEFAULT_ENABLED_ENGINES),
            renderer_url: lookup("RENDERER_URL").filter(|v| !v.trim().is_empty()),
            renderer_token: lookup("RENDERER_API_TOKEN")
                .filter(|v| !v.trim().is_empty())
                .map(ApiToken::from),
            render_concurrency: parse(&lookup, "RENDER_CONCURRENCY", 8)?,
            render_timeout_secs: parse(&lookup, "RENDER_TIMEOUT_SECS", 60)?,
            request_timeout_secs: parse(&lookup, "REQUEST_TIMEOUT_SECS", 300)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.content_filter_threshold) {
            bail!("CONTENT_FILTER_THRESHOLD must be between 0 and 1");
        }
        if self.default_search_limit == 0 {
            bail!("DEFAULT_SEARCH_LIMIT must be at least 1");
        }
        if self.render_concurrency == 0 {
            bail!("RENDER_CONCURRENCY must be at least 1");
        }
        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Defaults handed to the pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_default_limit(self.default_search_limit)
            .with_engines(EngineFilter::from_csv(
                &self.disabled_engines,
                &self.enabled_engines,
            ))
            .with_render_options(
                RenderOptions::default()
                    .with_density_threshold(self.content_filter_threshold)
                    .with_min_word_count(self.word_count_threshold),
            )
    }

    /// Configuration overview for startup logs. Never includes secrets.
    pub fn summary(&self) -> Value {
        json!({
            "searxng": {
                "host": self.searxng.host,
                "port": self.searxng.port,
                "base_path": self.searxng.base_path,
                "api_base": self.searxng.endpoint(),
                "language": self.searxng.language,
            },
            "api": {
                "host": self.api_host,
                "port": self.api_port,
                "request_timeout_secs": self.request_timeout_secs,
            },
            "crawler": {
                "default_search_limit": self.default_search_limit,
                "content_filter_threshold": self.content_filter_threshold,
                "word_count_threshold": self.word_count_threshold,
                "renderer": self.renderer_url.as_deref().unwrap_or("local"),
                "render_concurrency": self.render_concurrency,
                "render_timeout_secs": self.render_timeout_secs,
            },
            "search_engines": {
                "disabled": self.disabled_engines,
                "enabled": self.enabled_engines,
            }
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.searxng.endpoint(), "http://localhost:8080/search");
        assert_eq!(config.default_search_limit, 10);
        assert_eq!(config.content_filter_threshold, 0.6);
        assert_eq!(config.word_count_threshold, 10);
        assert_eq!(config.enabled_engines, "baidu__general");
        assert!(config.renderer_url.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_flow_into_pipeline_config() {
        let config = config_from(&[
            ("DEFAULT_SEARCH_LIMIT", "5"),
            ("CONTENT_FILTER_THRESHOLD", "0.45"),
            ("WORD_COUNT_THRESHOLD", "3"),
            ("DISABLED_ENGINES", "google__general"),
            ("ENABLED_ENGINES", "bing__general,baidu__general"),
        ])
        .unwrap();

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.default_limit, 5);
        assert_eq!(pipeline.render.content_density_threshold, 0.45);
        assert_eq!(pipeline.render.min_word_count, 3);
        assert_eq!(pipeline.engines.disabled, vec!["google__general"]);
        assert_eq!(pipeline.engines.enabled, vec!["bing__general", "baidu__general"]);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = config_from(&[("API_PORT", "three thousand")]).unwrap_err();
        assert!(err.to_string().contains("API_PORT"));

        assert!(config_from(&[("CONTENT_FILTER_THRESHOLD", "1.5")]).is_err());
        assert!(config_from(&[("RENDER_CONCURRENCY", "0")]).is_err());
    }

    #[test]
    fn test_summary_hides_token() {
        let config = config_from(&[
            ("RENDERER_URL", "http://renderer:11235"),
            ("RENDERER_API_TOKEN", "c4ai-secret"),
        ])
        .unwrap();

        let summary = config.summary();
        assert_eq!(summary["crawler"]["renderer"], "http://renderer:11235");
        assert_eq!(summary["searxng"]["api_base"], "http://localhost:8080/search");
        assert!(!summary.to_string().contains("c4ai-secret"));
        assert!(!format!("{:?}", config).contains("c4ai-secret"));
    }
}
