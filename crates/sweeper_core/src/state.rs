use crate::summary::DiscoverySummary;
use crate::{Criteria, ProbeVerdict};

/// Lifecycle of one discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Paginating,
    Dispatching,
    AwaitingProbes,
    Merging,
    Done,
    Aborted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Tally {
    pub started: bool,
    pub pages: usize,
    pub candidates_seen: usize,
    pub skipped: usize,
    pub accepted: usize,
    pub probes_launched: usize,
    pub in_flight: usize,
    pub stale: usize,
    pub recent: usize,
    pub no_activity: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub listing_done: bool,
    pub merged_total: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryState {
    criteria: Criteria,
    phase: Phase,
    tally: Tally,
    failure: Option<String>,
}

impl DiscoveryState {
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria,
            phase: Phase::Paginating,
            tally: Tally::default(),
            failure: None,
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn in_flight(&self) -> usize {
        self.tally.in_flight
    }

    pub fn summary(&self) -> DiscoverySummary {
        DiscoverySummary::from_parts(self.phase, &self.tally)
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn tally_mut(&mut self) -> &mut Tally {
        &mut self.tally
    }

    pub(crate) fn tally(&self) -> &Tally {
        &self.tally
    }

    pub(crate) fn abort(&mut self, reason: String) {
        self.phase = Phase::Aborted;
        self.failure = Some(reason);
    }

    pub(crate) fn record_verdict(&mut self, verdict: &ProbeVerdict) {
        let tally = &mut self.tally;
        tally.in_flight = tally.in_flight.saturating_sub(1);
        match verdict {
            ProbeVerdict::Stale(_) => tally.stale += 1,
            ProbeVerdict::Recent(_) => tally.recent += 1,
            ProbeVerdict::NoActivity => tally.no_activity += 1,
            ProbeVerdict::Failed(_) => tally.failed += 1,
            ProbeVerdict::Cancelled => tally.cancelled += 1,
        }
    }
}
