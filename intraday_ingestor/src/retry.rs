//! Bounded retry with a fixed delay between attempts.
//!
//! [`retry_with_policy`] retries any fallible async operation;
//! [`RetryingProvider`] applies it to every call of a wrapped
//! [`DataProvider`]. Only `Err` results are retried: an empty frame or a
//! frame with the wrong shape is a successful call as far as this module is
//! concerned.

use std::{fmt::Display, future::Future, num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use tracing::warn;

use crate::{
    models::{frame::RawFrame, request_params::IntradayRequest},
    providers::{DataProvider, ProviderError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included.
    pub max_attempts: NonZeroU32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: NonZeroU32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// One attempt, no waiting.
    pub const fn no_retry() -> Self {
        Self::new(NonZeroU32::MIN, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            Duration::from_secs(2),
        )
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts have failed,
/// sleeping `policy.delay` between attempts. The closure receives the
/// 1-based attempt number. The last error is returned unchanged.
pub async fn retry_with_policy<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.get();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(attempt, max_attempts, error = %err, "giving up");
                return Err(err);
            }
        }
    }
}

/// Provider middleware that retries failed fetches of the inner provider.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for RetryingProvider<P> {
    async fn fetch_frame(&self, request: &IntradayRequest) -> Result<RawFrame, ProviderError> {
        retry_with_policy(&self.policy, |_| self.inner.fetch_frame(request)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use tokio::time::Instant;

    use super::*;
    use crate::{
        models::timeframe::{Interval, Period},
        providers::ApiSnafu,
    };

    fn policy(attempts: u32, delay_ms: u64) -> RetryPolicy {
        RetryPolicy::new(
            NonZeroU32::new(attempts).unwrap(),
            Duration::from_millis(delay_ms),
        )
    }

    /// Fails the first `failures` calls, then answers with an empty frame.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DataProvider for Flaky {
        async fn fetch_frame(&self, _request: &IntradayRequest) -> Result<RawFrame, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return ApiSnafu {
                    message: format!("failure {call}"),
                }
                .fail();
            }
            Ok(RawFrame::new())
        }
    }

    fn request() -> IntradayRequest {
        IntradayRequest::new("AAPL", Period::ThirtyDays, Interval::FifteenMinutes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts_and_waits_between_them() {
        let provider = RetryingProvider::new(
            Flaky {
                failures: u32::MAX,
                calls: AtomicU32::new(0),
            },
            policy(3, 2000),
        );

        let started = Instant::now();
        let err = provider.fetch_frame(&request()).await.unwrap_err();

        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert!(started.elapsed() < Duration::from_secs(6));
        assert_eq!(err.to_string(), "API error: failure 3");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let provider = RetryingProvider::new(
            Flaky {
                failures: 1,
                calls: AtomicU32::new(0),
            },
            policy(3, 2000),
        );

        let started = Instant::now();
        let frame = provider.fetch_frame(&request()).await.unwrap();

        assert!(frame.is_empty());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_never_sleeps() {
        let started = Instant::now();
        let attempts = Mutex::new(Vec::new());
        let result: Result<(), String> = retry_with_policy(&RetryPolicy::no_retry(), |n| {
            attempts.lock().unwrap().push(n);
            async { Err("nope".to_string()) }
        })
        .await;

        assert_eq!(result, Err("nope".to_string()));
        assert_eq!(*attempts.lock().unwrap(), vec![1]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_numbers_count_from_one() {
        let seen = Mutex::new(Vec::new());
        let result = retry_with_policy(&policy(4, 10), |n| {
            seen.lock().unwrap().push(n);
            async move { if n < 3 { Err("not yet") } else { Ok(n) } }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn default_policy_is_three_attempts_two_seconds_apart() {
        assert_eq!(RetryPolicy::default(), policy(3, 2000));
    }
}
