mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use sweeper_engine::{
    ApiError, ChannelProgressSink, EngineEvent, FailureKind, NullProgressSink, RateLimit,
    RateLimitedExecutor, RetryPolicy, DEFAULT_BACKOFF,
};

use support::{init_logging, RecordingClock};

fn executor(clock: Arc<RecordingClock>) -> RateLimitedExecutor {
    RateLimitedExecutor::new(clock, Arc::new(NullProgressSink))
}

/// Fails with the scripted errors in order, then succeeds with the attempt number.
async fn scripted(calls: &AtomicU32, failures: &[ApiError]) -> Result<u32, ApiError> {
    let attempt = calls.fetch_add(1, Ordering::SeqCst);
    match failures.get(attempt as usize) {
        Some(err) => Err(err.clone()),
        None => Ok(attempt + 1),
    }
}

#[tokio::test]
async fn single_rate_limit_then_success_sleeps_once() {
    init_logging();
    let clock = Arc::new(RecordingClock::default());
    let calls = AtomicU32::new(0);
    let failures = [ApiError::rate_limited(None)];

    let value = executor(clock.clone())
        .execute("conversations.list", RetryPolicy::unbounded(), || {
            scripted(&calls, &failures)
        })
        .await
        .expect("recovered");

    assert_eq!(value, 2);
    assert_eq!(clock.sleeps(), vec![DEFAULT_BACKOFF]);
}

#[tokio::test]
async fn signalled_delay_is_honoured_and_zero_falls_back() {
    init_logging();
    let clock = Arc::new(RecordingClock::default());
    let calls = AtomicU32::new(0);
    let failures = [
        ApiError::rate_limited(Some(Duration::from_secs(3))),
        ApiError::rate_limited(Some(Duration::ZERO)),
    ];

    executor(clock.clone())
        .execute("conversations.list", RetryPolicy::unbounded(), || {
            scripted(&calls, &failures)
        })
        .await
        .expect("recovered");

    assert_eq!(clock.sleeps(), vec![Duration::from_secs(3), DEFAULT_BACKOFF]);
}

#[tokio::test]
async fn rate_limited_text_in_description_is_retried() {
    init_logging();
    let clock = Arc::new(RecordingClock::default());
    let calls = AtomicU32::new(0);
    let failures = [ApiError::new(
        FailureKind::Network,
        "slack server error: rate_limited",
    )];

    executor(clock.clone())
        .execute("conversations.history", RetryPolicy::attempts(2), || {
            scripted(&calls, &failures)
        })
        .await
        .expect("recovered");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(clock.sleeps(), vec![DEFAULT_BACKOFF]);
}

#[tokio::test]
async fn other_failures_are_terminal_without_retry() {
    init_logging();
    let clock = Arc::new(RecordingClock::default());
    let calls = AtomicU32::new(0);
    let failures = [ApiError::new(FailureKind::HttpStatus(500), "boom")];

    let err = executor(clock.clone())
        .execute("conversations.list", RetryPolicy::unbounded(), || {
            scripted(&calls, &failures)
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn bounded_policy_gives_up_without_a_trailing_sleep() {
    init_logging();
    let clock = Arc::new(RecordingClock::default());
    let calls = AtomicU32::new(0);
    let failures = vec![ApiError::rate_limited(None); 5];

    let err = executor(clock.clone())
        .execute("conversations.history", RetryPolicy::attempts(2), || {
            scripted(&calls, &failures)
        })
        .await
        .unwrap_err();

    assert_eq!(err.rate_limit(), Some(RateLimit::Unspecified));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(clock.sleeps(), vec![DEFAULT_BACKOFF]);
}

#[tokio::test]
async fn unbounded_policy_keeps_waiting_and_reports_each_backoff() {
    init_logging();
    let clock = Arc::new(RecordingClock::default());
    let (tx, rx) = mpsc::channel();
    let executor = RateLimitedExecutor::new(clock.clone(), Arc::new(ChannelProgressSink::new(tx)));
    let calls = AtomicU32::new(0);
    let failures = vec![ApiError::rate_limited(Some(Duration::from_secs(2))); 6];
    let policy = RetryPolicy::unbounded().with_default_backoff(Duration::from_secs(5));

    let value = executor
        .execute("conversations.list", policy, || scripted(&calls, &failures))
        .await
        .expect("recovered");

    assert_eq!(value, 7);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 6]);
    let attempts: Vec<_> = rx
        .try_iter()
        .filter_map(|event| match event {
            EngineEvent::RateLimited {
                operation, attempt, ..
            } if operation == "conversations.list" => Some(attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn policy_backoff_and_attempt_budget() {
    let policy = RetryPolicy::attempts(0);
    assert_eq!(policy.max_attempts(), Some(1));
    assert!(!policy.allows_another(1));

    let policy = RetryPolicy::attempts(2);
    assert!(policy.allows_another(1));
    assert!(!policy.allows_another(2));
    assert_eq!(policy.backoff(RateLimit::After(Duration::from_secs(12))), Duration::from_secs(12));
    assert_eq!(policy.backoff(RateLimit::After(Duration::ZERO)), DEFAULT_BACKOFF);
    assert_eq!(policy.backoff(RateLimit::Unspecified), DEFAULT_BACKOFF);

    assert!(RetryPolicy::unbounded().allows_another(u32::MAX - 1));
}
