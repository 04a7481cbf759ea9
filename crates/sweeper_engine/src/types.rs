use std::fmt;
use std::time::Duration;

use sweeper_core::{ChannelCandidate, ChannelInfo, Cursor, ProbeVerdict};

/// One page of the channel listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelPage {
    pub candidates: Vec<ChannelCandidate>,
    pub next_cursor: Cursor,
}

/// The most recent message of a channel, as returned by the history call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestMessage {
    pub ts: String,
}

/// How the remote service asked us to slow down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    After(Duration),
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::new(FailureKind::RateLimited { retry_after }, "rate_limited")
    }

    /// Classifies this failure as a rate-limit signal, if it is one.
    ///
    /// Besides the typed variant, any failure whose description mentions
    /// `rate_limited` (or Slack's `ratelimited` code) counts, with no delay.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        if let FailureKind::RateLimited { retry_after } = &self.kind {
            return Some(match retry_after {
                Some(wait) => RateLimit::After(*wait),
                None => RateLimit::Unspecified,
            });
        }
        let description = self.to_string();
        if description.contains("rate_limited") || description.contains("ratelimited") {
            return Some(RateLimit::Unspecified);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited { retry_after: Option<Duration> },
    /// `{"ok": false, "error": code}` from the Web API.
    Api { code: String },
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    InvalidUrl,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RateLimited { retry_after } => match retry_after {
                Some(wait) => write!(f, "rate limited (retry after {}s)", wait.as_secs()),
                None => write!(f, "rate limited"),
            },
            FailureKind::Api { code } => write!(f, "api error {code}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
        }
    }
}

/// Terminal outcome of a discovery run that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("error listing conversations: {0}")]
    Enumeration(#[source] ApiError),
}

/// Per-channel outcome of a bulk leave.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaveReport {
    pub left: Vec<ChannelInfo>,
    pub failed: Vec<(ChannelInfo, ApiError)>,
}

impl LeaveReport {
    pub fn attempted(&self) -> usize {
        self.left.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageFetched {
        page: usize,
        candidates: usize,
    },
    RateLimited {
        operation: &'static str,
        attempt: u32,
        wait: Duration,
    },
    ProbeFinished {
        channel_id: String,
        channel_name: String,
        verdict: ProbeVerdict,
    },
    LeaveFinished {
        index: usize,
        total: usize,
        channel: ChannelInfo,
        result: Result<(), ApiError>,
    },
}
