//! Fetch outcome classifier.
//!
//! Render failures are mostly transient (navigation timeouts, anti-bot
//! interstitials), so nothing is terminal on the first pass. The retry pass
//! applies the same inspection and turns every non-usable result into a
//! terminal failure.

use crate::types::render::{RawRender, RenderOutcome, UnusableReason};

/// Which fetch pass a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Retry,
}

/// What the fetcher does with one URL after a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Usable(String),
    RetryCandidate(UnusableReason),
    TerminalFailure(UnusableReason),
}

/// Read one raw render result. First matching rule wins.
pub fn inspect(raw: &RawRender) -> RenderOutcome {
    let record = match raw {
        RawRender::Missing => return unusable(UnusableReason::NullResult),
        RawRender::Errored(_) => return unusable(UnusableReason::Exception),
        RawRender::Record(record) => record,
    };

    match record.success {
        None => unusable(UnusableReason::MissingStatus),
        Some(false) => unusable(UnusableReason::NotSuccessful),
        Some(true) => match record.markdown.as_deref() {
            Some(content) if !content.trim().is_empty() => RenderOutcome::Usable {
                content: content.to_string(),
            },
            _ => unusable(UnusableReason::MissingContent),
        },
    }
}

/// Classify one raw result for the given pass.
pub fn classify(raw: &RawRender, pass: Pass) -> Disposition {
    match (inspect(raw), pass) {
        (RenderOutcome::Usable { content }, _) => Disposition::Usable(content),
        (RenderOutcome::Unusable { reason }, Pass::First) => Disposition::RetryCandidate(reason),
        (RenderOutcome::Unusable { reason }, Pass::Retry) => {
            Disposition::TerminalFailure(reason)
        }
    }
}

fn unusable(reason: UnusableReason) -> RenderOutcome {
    RenderOutcome::Unusable { reason }
}
