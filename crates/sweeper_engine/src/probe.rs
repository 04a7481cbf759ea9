use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use sweeper_core::{parse_message_ts, ChannelCandidate, ChannelInfo, Cutoff, ProbeVerdict};
use tokio_util::sync::CancellationToken;

use crate::gate::AdmissionGate;
use crate::retry::{RateLimitedExecutor, RetryPolicy};
use crate::slack::SlackApi;

/// Lock-guarded collection that concurrent probes append into.
#[derive(Debug, Clone, Default)]
pub struct ResultCollection {
    inner: Arc<Mutex<Vec<ChannelInfo>>>,
}

impl ResultCollection {
    pub fn push(&self, channel: ChannelInfo) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(channel);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes every collected entry, leaving the collection empty.
    pub fn drain(&self) -> Vec<ChannelInfo> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Looks up each candidate's most recent message and records the ones older
/// than the cutoff. Cheap to clone; one clone runs per probe task.
#[derive(Clone)]
pub struct ActivityProber {
    api: Arc<dyn SlackApi>,
    executor: RateLimitedExecutor,
    gate: AdmissionGate,
    cutoff: Cutoff,
    policy: RetryPolicy,
    pacing: Duration,
    results: ResultCollection,
    cancel: CancellationToken,
}

impl ActivityProber {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api: Arc<dyn SlackApi>,
        executor: RateLimitedExecutor,
        gate: AdmissionGate,
        cutoff: Cutoff,
        policy: RetryPolicy,
        pacing: Duration,
        results: ResultCollection,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            executor,
            gate,
            cutoff,
            policy,
            pacing,
            results,
            cancel,
        }
    }

    /// Probes one candidate.
    ///
    /// The admission slot is held from before the history call until the
    /// verdict is known (including the pacing pause for stale channels).
    /// A cancelled run abandons probes still waiting for a slot.
    pub async fn probe(&self, candidate: &ChannelCandidate) -> ProbeVerdict {
        let slot = match self.cancel.run_until_cancelled(self.gate.admit()).await {
            Some(Some(slot)) => slot,
            _ => {
                engine_trace!("Probe for #{} cancelled before admission", candidate.name);
                return ProbeVerdict::Cancelled;
            }
        };

        let verdict = self.lookup(candidate).await;
        if let ProbeVerdict::Stale(last_activity) = &verdict {
            self.results
                .push(ChannelInfo::from_candidate(candidate, Some(*last_activity)));
            self.executor.clock().sleep(self.pacing).await;
        }

        drop(slot);
        verdict
    }

    async fn lookup(&self, candidate: &ChannelCandidate) -> ProbeVerdict {
        let latest = self
            .executor
            .execute("conversations.history", self.policy, || {
                self.api.latest_message(&candidate.id)
            })
            .await;

        let message = match latest {
            Ok(Some(message)) => message,
            Ok(None) => return ProbeVerdict::NoActivity,
            Err(err) => {
                engine_debug!("History lookup for #{} failed: {}", candidate.name, err);
                return ProbeVerdict::Failed(err.to_string());
            }
        };

        match parse_message_ts(&message.ts) {
            None => {
                engine_debug!(
                    "Unreadable timestamp {:?} in #{}, skipping",
                    message.ts,
                    candidate.name
                );
                ProbeVerdict::NoActivity
            }
            Some(last_activity) if self.cutoff.is_stale(last_activity) => {
                ProbeVerdict::Stale(last_activity)
            }
            Some(last_activity) => ProbeVerdict::Recent(last_activity),
        }
    }
}
