use std::time::Duration;

use crate::enumerate::PAGE_SIZE;
use crate::gate::PROBE_CONCURRENCY;
use crate::retry::{RetryPolicy, DEFAULT_BACKOFF};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub page_size: u32,
    pub probe_concurrency: usize,
    /// Attempts per history lookup before the channel is dropped.
    pub probe_attempts: u32,
    pub default_backoff: Duration,
    /// Courtesy pause after a channel qualifies, while its slot is still held.
    pub probe_pacing: Duration,
    /// Pause between consecutive leave calls.
    pub leave_pacing: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            probe_concurrency: PROBE_CONCURRENCY,
            probe_attempts: 2,
            default_backoff: DEFAULT_BACKOFF,
            probe_pacing: Duration::from_secs(1),
            leave_pacing: Duration::from_secs(1),
        }
    }
}

impl DiscoverySettings {
    pub(crate) fn listing_policy(&self) -> RetryPolicy {
        RetryPolicy::unbounded().with_default_backoff(self.default_backoff)
    }

    pub(crate) fn probe_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(self.probe_attempts).with_default_backoff(self.default_backoff)
    }
}
