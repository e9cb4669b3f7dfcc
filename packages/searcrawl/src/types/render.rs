//! Render result types - what a renderer hands back per URL, and how the
//! pipeline reads it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One render attempt as reported by the rendering engine.
///
/// Renderers return one of these per input URL. The shape is deliberately
/// loose (every field optional) because rendering services report partial
/// records: the classifier decides what counts as usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderRecord {
    /// URL the record belongs to (may differ from the request after redirects)
    #[serde(default)]
    pub url: Option<String>,

    /// Success indicator reported by the renderer
    #[serde(default)]
    pub success: Option<bool>,

    /// Extracted markdown content
    #[serde(default)]
    pub markdown: Option<String>,

    /// Content-density score of the extracted content (0.0-1.0)
    #[serde(default)]
    pub density_score: Option<f32>,

    /// Renderer-provided failure description
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RenderRecord {
    /// A successful record carrying markdown.
    pub fn success(url: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            success: Some(true),
            markdown: Some(markdown.into()),
            ..Default::default()
        }
    }

    /// A record the renderer itself marked as failed.
    pub fn failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            success: Some(false),
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Attach a density score.
    pub fn with_density_score(mut self, score: f32) -> Self {
        self.density_score = Some(score);
        self
    }
}

/// Raw per-URL result of a `render_many` call.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRender {
    /// The renderer produced nothing for this URL
    Missing,

    /// Producing or decoding the per-URL result raised an error
    Errored(String),

    /// The renderer produced a record
    Record(RenderRecord),
}

impl From<RenderRecord> for RawRender {
    fn from(record: RenderRecord) -> Self {
        Self::Record(record)
    }
}

/// Why a render attempt did not yield usable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnusableReason {
    NullResult,
    MissingStatus,
    NotSuccessful,
    MissingContent,
    Exception,
}

impl fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NullResult => "result is null",
            Self::MissingStatus => "result missing success indicator",
            Self::NotSuccessful => "render not successful",
            Self::MissingContent => "result missing markdown content",
            Self::Exception => "error while reading result",
        };
        f.write_str(text)
    }
}

/// Classifier view of one render attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Usable { content: String },
    Unusable { reason: UnusableReason },
}
