use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};

use crate::clock::Clock;
use crate::progress::ProgressSink;
use crate::{ApiError, EngineEvent, RateLimit};

/// Wait applied when the service signals a rate limit without a usable delay.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(30);

/// How many times a call may be attempted and how long to back off between
/// rate-limited attempts. Only rate-limit failures are ever retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
    default_backoff: Duration,
}

impl RetryPolicy {
    /// Retry rate-limited calls until they succeed or fail otherwise.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            default_backoff: DEFAULT_BACKOFF,
        }
    }

    /// Give up after `max_attempts` calls in total.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            default_backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_default_backoff(mut self, backoff: Duration) -> Self {
        self.default_backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// A signalled delay of zero falls back to the default backoff.
    pub fn backoff(&self, signal: RateLimit) -> Duration {
        match signal {
            RateLimit::After(wait) if !wait.is_zero() => wait,
            _ => self.default_backoff,
        }
    }

    /// Whether another attempt is permitted after `attempts_made` calls.
    pub fn allows_another(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made < max,
            None => true,
        }
    }
}

/// Runs remote calls, sleeping and retrying when they are rate limited.
#[derive(Clone)]
pub struct RateLimitedExecutor {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ProgressSink>,
}

impl RateLimitedExecutor {
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn ProgressSink>) -> Self {
        Self { clock, sink }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub async fn execute<T, F, Fut>(
        &self,
        operation: &'static str,
        policy: RetryPolicy,
        mut request: F,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let err = match request().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(signal) = err.rate_limit() else {
                return Err(err);
            };

            if !policy.allows_another(attempt) {
                engine_debug!(
                    "{} still rate limited after {} attempt(s), giving up",
                    operation,
                    attempt
                );
                return Err(err);
            }

            let wait = policy.backoff(signal);
            engine_warn!(
                "Rate limit hit during {} (attempt {}). Waiting {}s before retrying...",
                operation,
                attempt,
                wait.as_secs()
            );
            self.sink.emit(EngineEvent::RateLimited {
                operation,
                attempt,
                wait,
            });
            self.clock.sleep(wait).await;
        }
    }
}
