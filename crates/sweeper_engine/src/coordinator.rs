use std::collections::VecDeque;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info};
use futures_util::StreamExt;
use sweeper_core::{
    update, ChannelCandidate, ChannelInfo, Criteria, Cursor, DiscoveryState, DiscoverySummary,
    Effect, Msg, Phase, ProbeVerdict,
};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::enumerate::ChannelEnumerator;
use crate::gate::AdmissionGate;
use crate::probe::{ActivityProber, ResultCollection};
use crate::progress::ProgressSink;
use crate::retry::RateLimitedExecutor;
use crate::settings::DiscoverySettings;
use crate::slack::SlackApi;
use crate::{ApiError, DiscoveryError, EngineEvent, FailureKind};

/// Channels matched by one run plus the counters describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Unordered; insertion order follows probe completion.
    pub channels: Vec<ChannelInfo>,
    pub summary: DiscoverySummary,
}

type ProbeResult = (ChannelCandidate, ProbeVerdict);

/// Drives the discovery state machine: pages are pulled one at a time while
/// probes for earlier pages keep running in the background.
pub struct DiscoveryCoordinator {
    api: Arc<dyn SlackApi>,
    executor: RateLimitedExecutor,
    sink: Arc<dyn ProgressSink>,
    settings: DiscoverySettings,
    gate: AdmissionGate,
}

impl DiscoveryCoordinator {
    pub fn new(
        api: Arc<dyn SlackApi>,
        executor: RateLimitedExecutor,
        sink: Arc<dyn ProgressSink>,
        settings: DiscoverySettings,
    ) -> Self {
        let gate = AdmissionGate::new(settings.probe_concurrency);
        Self {
            api,
            executor,
            sink,
            settings,
            gate,
        }
    }

    /// The gate shared by every probe this coordinator launches.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Runs one discovery pass.
    ///
    /// On an enumeration failure no further probes are dispatched, probes
    /// still waiting for a slot are cancelled, probes already admitted are
    /// drained, and only then is the error returned.
    pub async fn run(&self, criteria: Criteria) -> Result<DiscoveryReport, DiscoveryError> {
        let results = ResultCollection::default();
        let cancel = CancellationToken::new();
        let prober = criteria.cutoff.map(|cutoff| {
            ActivityProber::new(
                self.api.clone(),
                self.executor.clone(),
                self.gate.clone(),
                cutoff,
                self.settings.probe_policy(),
                self.settings.probe_pacing,
                results.clone(),
                cancel.clone(),
            )
        });

        let enumerator =
            ChannelEnumerator::new(self.api.as_ref(), &self.executor, criteria.types.clone())
                .with_page_size(self.settings.page_size)
                .with_policy(self.settings.listing_policy());
        let mut pages = Box::pin(enumerator.pages());
        let mut probes: JoinSet<ProbeResult> = JoinSet::new();
        let mut failure: Option<ApiError> = None;

        let mut state = DiscoveryState::new(criteria);
        let mut inbox = VecDeque::from([Msg::Start]);

        loop {
            while let Some(msg) = inbox.pop_front() {
                let (next, effects) = update(state, msg);
                state = next;

                for effect in effects {
                    match effect {
                        Effect::FetchNextPage => {
                            while let Some(joined) = probes.try_join_next() {
                                inbox.push_back(self.probe_finished(joined));
                            }
                            let msg = match pages.next().await {
                                Some(Ok(page)) => {
                                    self.sink.emit(EngineEvent::PageFetched {
                                        page: state.summary().pages + 1,
                                        candidates: page.candidates.len(),
                                    });
                                    Msg::PageFetched {
                                        candidates: page.candidates,
                                        next_cursor: page.next_cursor,
                                    }
                                }
                                Some(Err(err)) => {
                                    let reason = err.to_string();
                                    failure = Some(err);
                                    Msg::PageFailed { reason }
                                }
                                None => Msg::PageFetched {
                                    candidates: Vec::new(),
                                    next_cursor: Cursor::default(),
                                },
                            };
                            inbox.push_back(msg);
                        }
                        Effect::LaunchProbe { candidate } => match prober.as_ref() {
                            Some(prober) => {
                                let prober = prober.clone();
                                probes.spawn(async move {
                                    let verdict = prober.probe(&candidate).await;
                                    (candidate, verdict)
                                });
                            }
                            None => inbox.push_back(Msg::ProbeFinished {
                                channel_id: candidate.id,
                                verdict: ProbeVerdict::NoActivity,
                            }),
                        },
                        Effect::Accept { channel } => results.push(channel),
                        Effect::Merge => inbox.push_back(Msg::Merged {
                            total: results.len(),
                        }),
                        Effect::CancelPending => cancel.cancel(),
                    }
                }
            }

            if state.phase().is_terminal() {
                break;
            }
            match probes.join_next().await {
                Some(joined) => inbox.push_back(self.probe_finished(joined)),
                None => break,
            }
        }

        if state.phase() == Phase::Aborted {
            engine_debug!("Draining {} in-flight probe(s) after abort", probes.len());
            while let Some(joined) = probes.join_next().await {
                let (next, _) = update(state, self.probe_finished(joined));
                state = next;
            }
            let err = failure.unwrap_or_else(|| {
                ApiError::new(FailureKind::Network, state.failure().unwrap_or("aborted"))
            });
            engine_error!("Discovery aborted: {}", err);
            return Err(DiscoveryError::Enumeration(err));
        }

        let summary = state.summary();
        engine_info!(
            "Discovery finished: {} page(s), {} candidate(s), {} probe(s), {} match(es)",
            summary.pages,
            summary.candidates_seen,
            summary.probes_launched,
            results.len()
        );
        Ok(DiscoveryReport {
            channels: results.drain(),
            summary,
        })
    }

    fn probe_finished(&self, joined: Result<ProbeResult, JoinError>) -> Msg {
        match joined {
            Ok((candidate, verdict)) => {
                self.sink.emit(EngineEvent::ProbeFinished {
                    channel_id: candidate.id.clone(),
                    channel_name: candidate.name,
                    verdict: verdict.clone(),
                });
                Msg::ProbeFinished {
                    channel_id: candidate.id,
                    verdict,
                }
            }
            Err(err) => {
                engine_error!("Probe task failed: {}", err);
                Msg::ProbeFinished {
                    channel_id: String::new(),
                    verdict: ProbeVerdict::Failed(err.to_string()),
                }
            }
        }
    }
}
