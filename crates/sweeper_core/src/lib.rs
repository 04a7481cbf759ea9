//! Sweeper core: channel model, filters and the pure discovery state machine.
mod channel;
mod criteria;
mod effect;
mod msg;
mod state;
mod summary;
mod update;

pub use channel::{parse_message_ts, ChannelCandidate, ChannelInfo, Cursor, Visibility};
pub use criteria::{Admission, Criteria, Cutoff, SkipFilter, SkipReason};
pub use effect::Effect;
pub use msg::{Msg, ProbeVerdict};
pub use state::{DiscoveryState, Phase};
pub use summary::DiscoverySummary;
pub use update::update;
