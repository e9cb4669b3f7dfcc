//! Fetch and aggregation reports.

use serde::{Deserialize, Serialize};

/// Reduction of the fetch passes over one batch.
///
/// Every batch position lands in exactly one of `succeeded_urls` (and then
/// contributed the block at the same index of `usable_blocks`) or
/// `failed_urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Usable content, pass-1 blocks first, each pass in input order
    pub usable_blocks: Vec<String>,

    /// URL that produced each block, parallel to `usable_blocks`
    pub succeeded_urls: Vec<String>,

    /// URLs that failed both passes, in retry order
    pub failed_urls: Vec<String>,
}

impl FetchReport {
    /// Record a usable block.
    pub fn push_usable(&mut self, url: &str, content: String) {
        self.usable_blocks.push(content);
        self.succeeded_urls.push(url.to_string());
    }

    /// Record a terminal failure.
    pub fn push_failed(&mut self, url: &str) {
        self.failed_urls.push(url.to_string());
    }

    pub fn success_count(&self) -> usize {
        self.usable_blocks.len()
    }

    pub fn has_usable(&self) -> bool {
        !self.usable_blocks.is_empty()
    }
}

/// Public output of a search or crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Normalized plain text of all usable pages
    pub content: String,

    /// Number of pages that contributed to `content`
    pub success_count: usize,

    /// URLs that failed both fetch passes
    pub failed_urls: Vec<String>,
}
