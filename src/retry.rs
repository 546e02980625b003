use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Exponential backoff with jitter for calls that must eventually succeed
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Base delay; also the upper bound of the random jitter
    pub base_delay: Duration,
    /// Maximum delay between retries (jitter included)
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Create a new backoff policy
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Preset: remote translation calls.
    /// Delays: 2s, 4s, 8s, ... capped at 60s, each plus up to 1s of jitter
    pub fn translation() -> Self {
        Self::new(Duration::from_secs(1)).with_max_delay(Duration::from_secs(60))
    }

    /// Delay before the given retry (1-indexed), with `jitter` in `[0, 1)`.
    ///
    /// `min(base * 2^retry + jitter * base, max_delay)`. Each doubling adds at
    /// least `base`, more than the jitter can, so delays never decrease from
    /// one retry to the next.
    pub fn delay_for_retry(&self, retry: u32, jitter: f64) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let base = self.base_delay.as_secs_f64();
        let exponent = retry.min(64) as i32;
        let exponential = base * 2f64.powi(exponent);
        let jitter = base * jitter.clamp(0.0, 1.0);
        let total = (exponential + jitter).min(self.max_delay.as_secs_f64());

        Duration::from_secs_f64(total.max(0.0))
    }

    /// Delay before the given retry with fresh random jitter
    pub fn jittered_delay(&self, retry: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
        self.delay_for_retry(retry, jitter)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::translation()
    }
}

/// Result of an operation that was retried until it succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    /// Total attempts, including the successful one
    pub attempts: u32,
}

/// Execute an async operation until it succeeds.
///
/// There is no attempt limit: every error is logged and followed by a
/// backoff sleep. Callers that need a bound wrap the returned future in a
/// timeout or drop it.
pub async fn with_retry_forever<T, E, F, Fut>(
    policy: &BackoffPolicy,
    operation_name: &str,
    mut operation: F,
) -> Retried<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(
                        "{}: Succeeded on attempt {}",
                        operation_name,
                        retry + 1
                    );
                }
                return Retried {
                    value,
                    attempts: retry + 1,
                };
            }
            Err(e) => {
                retry = retry.saturating_add(1);
                let delay = policy.jittered_delay(retry);
                warn!(
                    "{}: Attempt {} failed ({}), retrying after {:.2}s",
                    operation_name,
                    retry,
                    e,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[test]
    fn test_backoff_policy_defaults() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_policy_builder_pattern() {
        let policy = BackoffPolicy::new(Duration::from_millis(50))
            .with_max_delay(Duration::from_secs(10));

        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_delay_calculation_without_jitter() {
        let policy = BackoffPolicy::new(Duration::from_secs(1));

        assert_eq!(policy.delay_for_retry(0, 0.0), Duration::ZERO);
        assert_eq!(policy.delay_for_retry(1, 0.0), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(2, 0.0), Duration::from_secs(4));
        assert_eq!(policy.delay_for_retry(3, 0.0), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_is_bounded_by_base_delay() {
        let policy = BackoffPolicy::new(Duration::from_secs(1));

        assert_eq!(policy.delay_for_retry(1, 0.5), Duration::from_millis(2500));
        // Out-of-range jitter is clamped
        assert_eq!(policy.delay_for_retry(1, 7.0), Duration::from_secs(3));
        assert_eq!(policy.delay_for_retry(1, -1.0), Duration::from_secs(2));
    }

    #[test]
    fn test_delay_respects_max() {
        let policy = BackoffPolicy::new(Duration::from_secs(1)).with_max_delay(Duration::from_secs(3));

        // Retry 4 would be 16 seconds, but max is 3
        assert_eq!(policy.delay_for_retry(4, 0.0), Duration::from_secs(3));
        assert_eq!(policy.delay_for_retry(4, 0.99), Duration::from_secs(3));
    }

    #[test]
    fn test_delay_huge_retry_count_does_not_overflow() {
        let policy = BackoffPolicy::translation();
        assert_eq!(policy.delay_for_retry(u32::MAX, 0.5), Duration::from_secs(60));
    }

    #[test]
    fn test_delays_never_decrease_for_worst_case_jitter() {
        let policy = BackoffPolicy::new(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(5));

        // Largest jitter on retry n against smallest jitter on retry n + 1
        for retry in 1..20 {
            let current = policy.delay_for_retry(retry, 0.999);
            let next = policy.delay_for_retry(retry + 1, 0.0);
            assert!(
                next >= current,
                "retry {} delay {:?} exceeds retry {} delay {:?}",
                retry,
                current,
                retry + 1,
                next
            );
            assert!(next <= policy.max_delay);
        }
    }

    #[test]
    fn test_jittered_delay_within_bounds() {
        let policy = BackoffPolicy::new(Duration::from_millis(100));
        for _ in 0..50 {
            let delay = policy.jittered_delay(1);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay < Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn test_with_retry_forever_succeeds_first_attempt() {
        let policy = BackoffPolicy::new(Duration::from_millis(10));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry_forever(&policy, "test", || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(42)
            }
        })
        .await;

        assert_eq!(result.value, 42);
        assert_eq!(result.attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_forever_fails_twice_then_succeeds() {
        let policy = BackoffPolicy::new(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(350));
        let attempts_at = Arc::new(Mutex::new(Vec::new()));
        let attempts_clone = attempts_at.clone();

        let result = with_retry_forever(&policy, "flaky", || {
            let log = attempts_clone.clone();
            async move {
                let mut log = log.lock().unwrap();
                log.push(Instant::now());
                if log.len() <= 2 {
                    Err("temporary failure")
                } else {
                    Ok("translated")
                }
            }
        })
        .await;

        assert_eq!(result.value, "translated");
        assert_eq!(result.attempts, 3);

        let times = attempts_at.lock().unwrap().clone();
        assert_eq!(times.len(), 3);
        let first_wait = times[1] - times[0];
        let second_wait = times[2] - times[1];

        assert!(first_wait >= Duration::from_millis(200), "got {:?}", first_wait);
        assert!(
            second_wait >= first_wait,
            "delays must not decrease: {:?} then {:?}",
            first_wait,
            second_wait
        );
        // Allow for the paused clock's timer granularity
        assert!(second_wait <= Duration::from_millis(351), "got {:?}", second_wait);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_forever_keeps_going_past_many_failures() {
        let policy = BackoffPolicy::new(Duration::from_millis(1)).with_max_delay(Duration::from_millis(5));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry_forever(&policy, "many_attempts", || {
            let c = counter_clone.clone();
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst);
                if attempt < 25 {
                    Err(format!("failure {}", attempt))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.value, 25);
        assert_eq!(result.attempts, 26);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_forever_can_be_cancelled_by_timeout() {
        let policy = BackoffPolicy::new(Duration::from_millis(10));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            with_retry_forever(&policy, "never", || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("permanent failure")
                }
            }),
        )
        .await;

        assert!(outcome.is_err(), "retry loop should still be running");
        assert!(counter.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_no_delay_on_immediate_success() {
        let policy = BackoffPolicy::new(Duration::from_secs(10));

        let start = std::time::Instant::now();
        let result = with_retry_forever(&policy, "immediate_success", || async {
            Ok::<_, String>(42)
        })
        .await;

        assert_eq!(result.value, 42);
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "Expected quick completion, got {:?}",
            start.elapsed()
        );
    }
}
