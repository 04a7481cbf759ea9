use std::sync::Arc;

use sweeper_core::{ChannelInfo, Criteria, Cutoff};

use crate::clock::{Clock, SystemClock};
use crate::coordinator::{DiscoveryCoordinator, DiscoveryReport};
use crate::leave::LeaveExecutor;
use crate::progress::ProgressSink;
use crate::retry::RateLimitedExecutor;
use crate::settings::DiscoverySettings;
use crate::slack::{ReqwestSlackApi, SlackApi, SlackSettings};
use crate::{ApiError, DiscoveryError, LeaveReport};

/// Entry point for callers: discovery followed by an optional bulk leave,
/// sharing one client, clock and progress sink.
pub struct Sweeper {
    api: Arc<dyn SlackApi>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ProgressSink>,
    settings: DiscoverySettings,
}

impl Sweeper {
    pub fn new(
        api: Arc<dyn SlackApi>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ProgressSink>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            api,
            clock,
            sink,
            settings,
        }
    }

    /// Talks to the real Web API with the system clock.
    pub fn connect(
        slack: SlackSettings,
        sink: Arc<dyn ProgressSink>,
        settings: DiscoverySettings,
    ) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestSlackApi::new(slack)?);
        Ok(Self::new(api, Arc::new(SystemClock), sink, settings))
    }

    /// `now - days`, or `None` when `days` is zero (no date filter).
    pub fn cutoff_for_days(&self, days: u32) -> Option<Cutoff> {
        (days > 0).then(|| Cutoff::days_before(self.clock.now(), days))
    }

    pub fn coordinator(&self) -> DiscoveryCoordinator {
        DiscoveryCoordinator::new(
            self.api.clone(),
            self.executor(),
            self.sink.clone(),
            self.settings.clone(),
        )
    }

    pub async fn discover(&self, criteria: Criteria) -> Result<DiscoveryReport, DiscoveryError> {
        self.coordinator().run(criteria).await
    }

    pub async fn leave(&self, channels: &[ChannelInfo]) -> LeaveReport {
        LeaveExecutor::new(
            self.api.clone(),
            self.executor(),
            self.sink.clone(),
            self.settings.probe_policy(),
            self.settings.leave_pacing,
        )
        .leave_all(channels)
        .await
    }

    fn executor(&self) -> RateLimitedExecutor {
        RateLimitedExecutor::new(self.clock.clone(), self.sink.clone())
    }
}
