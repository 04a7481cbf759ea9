use engine_logging::{engine_debug, engine_warn};
use sweeper_core::ProbeVerdict;
use sweeper_engine::{EngineEvent, ProgressSink};

/// Forwards engine progress to the log; details only show with `--verbose`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::PageFetched { page, candidates } => {
                engine_debug!("Fetched page {} with {} channels", page, candidates);
            }
            EngineEvent::RateLimited {
                operation,
                attempt,
                wait,
            } => {
                engine_debug!(
                    "{} rate limited on attempt {}, waiting {:?}",
                    operation,
                    attempt,
                    wait
                );
            }
            EngineEvent::ProbeFinished {
                channel_name,
                verdict,
                ..
            } => match verdict {
                ProbeVerdict::Stale(at) => {
                    engine_debug!("#{} is stale (last message {})", channel_name, at.to_rfc2822());
                }
                ProbeVerdict::Recent(at) => {
                    engine_debug!("#{} is active (last message {})", channel_name, at.to_rfc2822());
                }
                ProbeVerdict::NoActivity => {
                    engine_debug!("#{} has no messages", channel_name);
                }
                ProbeVerdict::Failed(reason) => {
                    engine_warn!("Could not check #{}: {}", channel_name, reason);
                }
                ProbeVerdict::Cancelled => {
                    engine_debug!("Check of #{} cancelled", channel_name);
                }
            },
            // The leave executor logs each outcome itself.
            EngineEvent::LeaveFinished { .. } => {}
        }
    }
}
