//! Retry schedule for Converse calls and the operational hook contract it reports to.

use std::future::Future;
use std::time::Duration;

use crate::{ProviderError, ProviderErrorKind, ProviderId};

/// How a failed attempt is treated by [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Throttling or a model that is still loading. Waits start at the throttle delay.
    Throttled,
    /// Timeouts, dropped connections and 5xx responses.
    Transient,
    Permanent,
}

impl RetryClass {
    pub fn of(error: &ProviderError) -> Self {
        match error.kind {
            _ if !error.retryable => Self::Permanent,
            ProviderErrorKind::RateLimited => Self::Throttled,
            _ => Self::Transient,
        }
    }
}

/// Exponential schedule: the first wait is `base_delay` (or `throttle_delay`
/// for throttled errors), doubling per attempt up to `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub throttle_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            throttle_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self::new(1)
    }

    /// Sets the first wait and the cap. The throttle delay is clamped to the cap.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.base_delay = initial;
        self.max_delay = max.max(initial);
        self
    }

    pub fn with_throttle_delay(mut self, delay: Duration) -> Self {
        self.throttle_delay = delay;
        self
    }

    /// Wait before the attempt after `attempt`, or `None` when `error` ends the call.
    pub fn next_delay(&self, attempt: u32, error: &ProviderError) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let first = match RetryClass::of(error) {
            RetryClass::Permanent => return None,
            RetryClass::Transient => self.base_delay,
            RetryClass::Throttled => self.throttle_delay.max(self.base_delay),
        };
        let factor = 1_u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);

        Some(first.saturating_mul(factor).min(self.max_delay))
    }
}

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _provider: ProviderId, _operation: &str, _attempts: u32) {}

    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempts: u32,
        _error: &ProviderError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Runs `execute` until it succeeds or [`RetryPolicy::next_delay`] gives up.
/// `sleep` is injected so tests never wait.
pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    provider: ProviderId,
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(provider, operation, attempt);

        let error = match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(provider, operation, attempt);
                return Ok(value);
            }
            Err(error) => error,
        };

        let Some(delay) = policy.next_delay(attempt, &error) else {
            hooks.on_failure(provider, operation, attempt, &error);
            return Err(error);
        };

        hooks.on_retry_scheduled(provider, operation, attempt, delay, &error);
        sleep(delay).await;
        attempt += 1;
    }
}
