//! Exponential backoff around any [`FetchPage`] implementation.
//!
//! # Backoff Strategy
//!
//! ```text
//! delay(attempt) = base_delay * 2^(attempt-1)
//! ```
//!
//! With the defaults (3 attempts, 1 s base) a failing request is tried at
//! t=0, t=1s and t=3s. Every failure is retried, definitive 4xx included,
//! unless the [`RetryPolicy::TransientOnly`] policy is selected; then errors
//! that are not [`FetchError::is_transient`] are returned immediately.

use super::{FetchPage, FetchRequest, FetchedPage};
use crate::error::FetchError;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Which failures the backoff loop tries again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Retry every failure until the attempt budget is spent.
    #[default]
    All,
    /// Give up at once on errors that are not transient.
    TransientOnly,
}

impl RetryPolicy {
    fn should_retry(self, err: &FetchError) -> bool {
        match self {
            RetryPolicy::All => true,
            RetryPolicy::TransientOnly => err.is_transient(),
        }
    }
}

pub struct RetryFetch<T> {
    inner: T,
    policy: RetryPolicy,
    /// Total attempts, the first one included.
    max_attempts: usize,
    /// Delay before the second attempt.
    base_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    pub fn new(inner: T, max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        self.base_delay.saturating_mul(1 << shift)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage,
{
    #[instrument(level = "info", skip_all, fields(url = %request.url))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(request).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    let retry = self.policy.should_retry(&e);
                    if !retry || attempt >= self.max_attempts {
                        error!(
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_attempt,
                            elapsed_ms_total,
                            retry,
                            error = %e,
                            "fetch() giving up"
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use url::Url;

    /// Plays back a scripted sequence of outcomes.
    struct Scripted {
        outcomes: RefCell<Vec<Result<(), FetchError>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(mut outcomes: Vec<Result<(), FetchError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: RefCell::new(outcomes),
                calls: Cell::new(0),
            }
        }
    }

    impl FetchPage for Scripted {
        async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let next = self.outcomes.borrow_mut().pop().unwrap_or(Ok(()));
            next.map(|()| FetchedPage {
                url: request.url.clone(),
                status: 200,
                content_type: None,
                body: "ok".to_string(),
            })
        }
    }

    fn request() -> FetchRequest {
        FetchRequest::page(
            Url::parse("https://example.com/").unwrap(),
            &crate::config::ExtractorConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let retry = RetryFetch::new(
            Scripted::new(vec![Err(FetchError::Timeout), Err(FetchError::NetworkError("reset".into()))]),
            3,
            Duration::from_millis(1000),
        );

        let t0 = tokio::time::Instant::now();
        let page = retry.fetch(&request()).await.unwrap();

        assert_eq!(page.body, "ok");
        assert_eq!(retry.inner().calls.get(), 3);
        // 1s + 2s of backoff on the paused clock.
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempt_budget() {
        let retry = RetryFetch::new(
            Scripted::new(vec![Err(FetchError::Timeout); 5]),
            3,
            Duration::from_millis(1000),
        );

        let err = retry.fetch(&request()).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
        assert_eq!(retry.inner().calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_retried_by_default() {
        let retry = RetryFetch::new(
            Scripted::new(vec![Err(FetchError::HttpError(404)); 5]),
            3,
            Duration::from_millis(1000),
        );

        let err = retry.fetch(&request()).await.unwrap_err();
        assert_eq!(err, FetchError::HttpError(404));
        assert_eq!(retry.inner().calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_only_policy_fails_fast() {
        let retry = RetryFetch::new(
            Scripted::new(vec![Err(FetchError::HttpError(404))]),
            3,
            Duration::from_millis(1000),
        )
        .with_policy(RetryPolicy::TransientOnly);

        let t0 = tokio::time::Instant::now();
        let err = retry.fetch(&request()).await.unwrap_err();
        assert_eq!(err, FetchError::HttpError(404));
        assert_eq!(retry.inner().calls.get(), 1);
        assert!(t0.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_only_policy_still_retries_timeouts() {
        let retry = RetryFetch::new(
            Scripted::new(vec![Err(FetchError::Timeout), Err(FetchError::AccessDenied)]),
            3,
            Duration::from_millis(1000),
        )
        .with_policy(RetryPolicy::TransientOnly);

        assert_eq!(retry.fetch(&request()).await.unwrap_err(), FetchError::AccessDenied);
        assert_eq!(retry.inner().calls.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_are_retried() {
        let retry = RetryFetch::new(
            Scripted::new(vec![Err(FetchError::HttpError(503))]),
            3,
            Duration::from_millis(1000),
        );

        assert!(retry.fetch(&request()).await.is_ok());
        assert_eq!(retry.inner().calls.get(), 2);
    }

    #[test]
    fn test_delay_doubles() {
        let retry = RetryFetch::new(Scripted::new(vec![]), 3, Duration::from_millis(1000));
        assert_eq!(retry.delay_for(1), Duration::from_secs(1));
        assert_eq!(retry.delay_for(2), Duration::from_secs(2));
        assert_eq!(retry.delay_for(3), Duration::from_secs(4));
    }
}
