//! Renderer implementations.
//!
//! - [`RemoteRenderer`] drives a headless-browser rendering service.
//! - [`HttpRenderer`] fetches static HTML and extracts content locally.

pub mod extract;
pub mod http;
pub mod remote;

pub use extract::{extract_content, ExtractedContent};
pub use http::{HttpRenderer, DEFAULT_MAX_CONCURRENCY};
pub use remote::RemoteRenderer;
