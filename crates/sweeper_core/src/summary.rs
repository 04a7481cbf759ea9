use crate::state::{Phase, Tally};

/// Read-only counters describing a run, for logging and the final report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoverySummary {
    pub phase: Phase,
    pub pages: usize,
    pub candidates_seen: usize,
    pub skipped: usize,
    pub accepted_without_probe: usize,
    pub probes_launched: usize,
    pub probes_in_flight: usize,
    pub stale: usize,
    pub recent: usize,
    pub no_activity: usize,
    pub probe_failures: usize,
    pub probes_cancelled: usize,
    pub listing_complete: bool,
    pub merged_total: Option<usize>,
}

impl DiscoverySummary {
    pub(crate) fn from_parts(phase: Phase, tally: &Tally) -> Self {
        Self {
            phase,
            pages: tally.pages,
            candidates_seen: tally.candidates_seen,
            skipped: tally.skipped,
            accepted_without_probe: tally.accepted,
            probes_launched: tally.probes_launched,
            probes_in_flight: tally.in_flight,
            stale: tally.stale,
            recent: tally.recent,
            no_activity: tally.no_activity,
            probe_failures: tally.failed,
            probes_cancelled: tally.cancelled,
            listing_complete: tally.listing_done,
            merged_total: tally.merged_total,
        }
    }

    pub fn probes_completed(&self) -> usize {
        self.stale + self.recent + self.no_activity + self.probe_failures + self.probes_cancelled
    }
}
