//! Reducer: fetch report to aggregated result.

use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::pipeline::normalize::normalize;
use crate::types::report::{AggregatedResult, FetchReport};

/// Marker placed between consecutive content blocks before normalization.
pub const SEPARATOR: &str = "\n\n==========\n\n";

/// Join usable blocks, normalize the whole, and count successes.
///
/// Normalization runs once over the joined text, so the separator line is
/// still visible in the output as a bare `==========` line between pages.
/// The output is not a normalization fixed point: normalizing it again turns
/// each marker into a setext heading underline and drops it.
pub fn reduce(report: FetchReport) -> Result<AggregatedResult> {
    if !report.has_usable() {
        warn!(
            failed = report.failed_urls.len(),
            "No usable content from any URL"
        );
        return Err(PipelineError::AllFetchesFailed {
            failed_urls: report.failed_urls,
        });
    }

    let success_count = report.success_count();
    let content = normalize(&report.usable_blocks.join(SEPARATOR));

    info!(
        success_count,
        failed = report.failed_urls.len(),
        content_length = content.len(),
        "Crawl results aggregated"
    );

    Ok(AggregatedResult {
        content,
        success_count,
        failed_urls: report.failed_urls,
    })
}
