#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, Once};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sweeper_core::{ChannelCandidate, Cursor, Visibility};
use sweeper_engine::{
    ApiError, ChannelPage, ChannelProgressSink, Clock, DiscoverySettings, EngineEvent,
    FailureKind, LatestMessage, ListRequest, SlackApi, Sweeper,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - chrono::Duration::days(days)
}

pub fn slack_ts(instant: DateTime<Utc>) -> String {
    format!("{}.000200", instant.timestamp())
}

pub fn member(id: &str, name: &str) -> ChannelCandidate {
    ChannelCandidate {
        id: id.to_string(),
        name: name.to_string(),
        is_member: true,
        visibility: Visibility::Public,
    }
}

pub fn outsider(id: &str, name: &str) -> ChannelCandidate {
    ChannelCandidate {
        is_member: false,
        ..member(id, name)
    }
}

/// Fixed wall clock whose sleeps are recorded instead of waited out.
#[derive(Debug, Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// In-memory workspace: a fixed set of pages, per-channel latest messages and
/// scripted failures.
#[derive(Default)]
pub struct FakeSlack {
    pages: Vec<Vec<ChannelCandidate>>,
    latest: HashMap<String, String>,
    list_failures: Mutex<VecDeque<ApiError>>,
    fail_page: Option<(usize, ApiError)>,
    history_failures: Mutex<HashMap<String, VecDeque<ApiError>>>,
    leave_failures: HashSet<String>,
    history_delay: Duration,
    list_delay: Duration,
    list_requests: Mutex<Vec<ListRequest>>,
    history_calls: Mutex<Vec<String>>,
    leave_calls: Mutex<Vec<String>>,
    history_active: AtomicUsize,
    history_peak: AtomicUsize,
}

impl FakeSlack {
    pub fn new(pages: Vec<Vec<ChannelCandidate>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn with_latest(mut self, channel_id: &str, instant: DateTime<Utc>) -> Self {
        self.latest.insert(channel_id.to_string(), slack_ts(instant));
        self
    }

    pub fn with_raw_latest(mut self, channel_id: &str, ts: &str) -> Self {
        self.latest.insert(channel_id.to_string(), ts.to_string());
        self
    }

    /// Each listing call pops one scripted failure before serving pages.
    pub fn with_list_failure(self, err: ApiError) -> Self {
        self.list_failures.lock().unwrap().push_back(err);
        self
    }

    /// Every request for the page at `index` (0-based) fails with `err`.
    pub fn with_failing_page(mut self, index: usize, err: ApiError) -> Self {
        self.fail_page = Some((index, err));
        self
    }

    pub fn with_history_failure(self, channel_id: &str, err: ApiError) -> Self {
        self.history_failures
            .lock()
            .unwrap()
            .entry(channel_id.to_string())
            .or_default()
            .push_back(err);
        self
    }

    pub fn with_leave_failure(mut self, channel_id: &str) -> Self {
        self.leave_failures.insert(channel_id.to_string());
        self
    }

    pub fn with_history_delay(mut self, delay: Duration) -> Self {
        self.history_delay = delay;
        self
    }

    /// Every listing call suspends for `delay` before answering.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn list_requests(&self) -> Vec<ListRequest> {
        self.list_requests.lock().unwrap().clone()
    }

    pub fn history_calls(&self) -> Vec<String> {
        self.history_calls.lock().unwrap().clone()
    }

    pub fn leave_calls(&self) -> Vec<String> {
        self.leave_calls.lock().unwrap().clone()
    }

    pub fn history_peak(&self) -> usize {
        self.history_peak.load(Ordering::SeqCst)
    }

    fn page_index(cursor: Option<&Cursor>) -> usize {
        cursor
            .and_then(|cursor| cursor.as_str().strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl SlackApi for FakeSlack {
    async fn list_channels(&self, request: &ListRequest) -> Result<ChannelPage, ApiError> {
        self.list_requests.lock().unwrap().push(request.clone());
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        if let Some(err) = self.list_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let index = Self::page_index(request.cursor.as_ref());
        if let Some((failing, err)) = &self.fail_page {
            if *failing == index {
                return Err(err.clone());
            }
        }

        let candidates = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < self.pages.len() {
            Cursor::new(format!("page-{}", index + 1))
        } else {
            Cursor::default()
        };
        Ok(ChannelPage {
            candidates,
            next_cursor,
        })
    }

    async fn latest_message(&self, channel_id: &str) -> Result<Option<LatestMessage>, ApiError> {
        self.history_calls.lock().unwrap().push(channel_id.to_string());
        let scripted = self
            .history_failures
            .lock()
            .unwrap()
            .get_mut(channel_id)
            .and_then(VecDeque::pop_front);
        if let Some(err) = scripted {
            return Err(err);
        }

        let active = self.history_active.fetch_add(1, Ordering::SeqCst) + 1;
        self.history_peak.fetch_max(active, Ordering::SeqCst);
        if !self.history_delay.is_zero() {
            tokio::time::sleep(self.history_delay).await;
        }
        self.history_active.fetch_sub(1, Ordering::SeqCst);

        Ok(self
            .latest
            .get(channel_id)
            .map(|ts| LatestMessage { ts: ts.clone() }))
    }

    async fn leave_channel(&self, channel_id: &str) -> Result<(), ApiError> {
        self.leave_calls.lock().unwrap().push(channel_id.to_string());
        if self.leave_failures.contains(channel_id) {
            return Err(ApiError::new(
                FailureKind::Api {
                    code: "cant_leave_general".to_string(),
                },
                "conversations.leave failed: cant_leave_general",
            ));
        }
        Ok(())
    }
}

pub fn terminal_error(code: &str) -> ApiError {
    ApiError::new(
        FailureKind::Api {
            code: code.to_string(),
        },
        format!("conversations.list failed: {code}"),
    )
}

/// A sweeper over `api` with a recording clock and a channel-backed sink.
pub struct Harness {
    pub api: Arc<FakeSlack>,
    pub clock: Arc<RecordingClock>,
    pub sweeper: Sweeper,
    events: mpsc::Receiver<EngineEvent>,
}

impl Harness {
    pub fn new(api: FakeSlack) -> Self {
        Self::with_settings(api, DiscoverySettings::default())
    }

    pub fn with_settings(api: FakeSlack, settings: DiscoverySettings) -> Self {
        let api = Arc::new(api);
        let clock = Arc::new(RecordingClock::default());
        let (tx, events) = mpsc::channel();
        let sweeper = Sweeper::new(
            api.clone(),
            clock.clone(),
            Arc::new(ChannelProgressSink::new(tx)),
            settings,
        );
        Self {
            api,
            clock,
            sweeper,
            events,
        }
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.try_iter().collect()
    }
}
