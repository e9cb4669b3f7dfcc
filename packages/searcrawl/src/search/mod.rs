//! Search backend implementations.

pub mod searxng;

pub use searxng::{SearxngConfig, SearxngSearcher};
