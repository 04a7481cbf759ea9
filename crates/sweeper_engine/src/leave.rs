use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use sweeper_core::ChannelInfo;

use crate::progress::ProgressSink;
use crate::retry::{RateLimitedExecutor, RetryPolicy};
use crate::slack::SlackApi;
use crate::{EngineEvent, LeaveReport};

/// Leaves channels one at a time. A failed item is logged and reported but
/// never stops the batch.
pub struct LeaveExecutor {
    api: Arc<dyn SlackApi>,
    executor: RateLimitedExecutor,
    sink: Arc<dyn ProgressSink>,
    policy: RetryPolicy,
    pacing: Duration,
}

impl LeaveExecutor {
    pub fn new(
        api: Arc<dyn SlackApi>,
        executor: RateLimitedExecutor,
        sink: Arc<dyn ProgressSink>,
        policy: RetryPolicy,
        pacing: Duration,
    ) -> Self {
        Self {
            api,
            executor,
            sink,
            policy,
            pacing,
        }
    }

    pub async fn leave_all(&self, channels: &[ChannelInfo]) -> LeaveReport {
        let total = channels.len();
        let mut report = LeaveReport::default();
        engine_info!("Leaving {} channel(s)...", total);

        for (index, channel) in channels.iter().enumerate() {
            if index > 0 {
                self.executor.clock().sleep(self.pacing).await;
            }
            engine_info!(
                "[{}/{}] Leaving #{} (ID: {})...",
                index + 1,
                total,
                channel.name,
                channel.id
            );

            let result = self
                .executor
                .execute("conversations.leave", self.policy, || {
                    self.api.leave_channel(&channel.id)
                })
                .await;

            self.sink.emit(EngineEvent::LeaveFinished {
                index,
                total,
                channel: channel.clone(),
                result: result.clone(),
            });
            match result {
                Ok(()) => {
                    engine_info!("Left #{}", channel.name);
                    report.left.push(channel.clone());
                }
                Err(err) => {
                    engine_error!("Failed to leave #{}: {}", channel.name, err);
                    report.failed.push((channel.clone(), err));
                }
            }
        }

        report
    }
}
