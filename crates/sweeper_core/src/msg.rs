use chrono::{DateTime, Utc};

use crate::{ChannelCandidate, Cursor};

/// Result of probing one channel's most recent activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// Last activity strictly before the cutoff; the channel was recorded.
    Stale(DateTime<Utc>),
    /// Last activity at or after the cutoff.
    Recent(DateTime<Utc>),
    /// Empty history or an unreadable timestamp.
    NoActivity,
    /// The history lookup failed or ran out of attempts.
    Failed(String),
    /// Abandoned before admission because the run was aborted.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the run by requesting the first page.
    Start,
    /// The enumerator produced one page.
    PageFetched {
        candidates: Vec<ChannelCandidate>,
        next_cursor: Cursor,
    },
    /// The enumerator hit a non-recoverable error.
    PageFailed { reason: String },
    /// A probe task ran to completion, whatever its outcome.
    ProbeFinished {
        channel_id: String,
        verdict: ProbeVerdict,
    },
    /// The result collection was drained into the final report.
    Merged { total: usize },
}
