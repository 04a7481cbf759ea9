use crate::{ChannelCandidate, ChannelInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Pull the next page from the enumerator, which owns the cursor.
    FetchNextPage,
    /// Spawn an activity probe for this candidate.
    LaunchProbe { candidate: ChannelCandidate },
    /// Append directly to the result collection (no date filter).
    Accept { channel: ChannelInfo },
    /// Every probe has finished; drain the result collection.
    Merge,
    /// Enumeration failed; abandon probes that are not yet admitted.
    CancelPending,
}
