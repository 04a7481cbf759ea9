//! Sweeper engine: Slack client, rate-limit handling and the concurrent
//! discovery pipeline.
mod clock;
mod coordinator;
mod engine;
mod enumerate;
mod gate;
mod leave;
mod probe;
mod progress;
mod retry;
mod settings;
mod slack;
mod types;

pub use clock::{Clock, SystemClock};
pub use coordinator::{DiscoveryCoordinator, DiscoveryReport};
pub use engine::Sweeper;
pub use enumerate::{ChannelEnumerator, PAGE_SIZE};
pub use gate::{AdmissionGate, GateSlot, PROBE_CONCURRENCY};
pub use leave::LeaveExecutor;
pub use probe::{ActivityProber, ResultCollection};
pub use progress::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use retry::{RateLimitedExecutor, RetryPolicy, DEFAULT_BACKOFF};
pub use settings::DiscoverySettings;
pub use slack::{ListRequest, ReqwestSlackApi, SlackApi, SlackSettings, DEFAULT_BASE_URL};
pub use types::{
    ApiError, ChannelPage, DiscoveryError, EngineEvent, FailureKind, LatestMessage, LeaveReport,
    RateLimit,
};
