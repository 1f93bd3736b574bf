//! Retry for bound operations.
//!
//! The interpreter never retries. Retrying is a property of an individual
//! bound operation, opted into by wrapping its handler in [`Retrying`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::context::EffectContext;
use super::handler::OperationHandler;

/// Exponential backoff configuration.
///
/// # Backoff Calculation
///
/// The delay before retry N is: `min(base_delay * 2^(N-1), max_delay)`
///
/// With defaults (base=200ms, max=5s):
/// - Attempt 2: 200ms delay
/// - Attempt 3: 400ms delay
/// - then the last fault is returned to the workflow
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use effectflow::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
///
/// let patient = RetryPolicy {
///     max_attempts: 6,
///     base_delay: Duration::from_millis(500),
///     max_delay: Duration::from_secs(10),
/// };
/// assert!(patient.should_retry(5));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the initial one. Default: 3.
    pub max_attempts: u32,

    /// Base delay for exponential backoff. Default: 200 milliseconds.
    pub base_delay: Duration,

    /// Maximum delay between attempts. Default: 5 seconds.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Returns `true` if another attempt should follow the failed `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after the failed `attempt` (1-based).
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        // base * 2^(attempt-1), capped at max
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(multiplier);
        delay.min(self.max_delay)
    }
}

/// Wraps a bound operation so that retryable faults are retried with backoff.
///
/// Only faults for which `retryable` returns `true` are retried; everything
/// else, and the last fault once attempts run out, is returned unchanged. The
/// same [`EffectContext`] is passed to every attempt, so the idempotency key
/// stays stable.
///
/// # Example
///
/// ```ignore
/// let bindings = Retrying::new(
///     DeviceBindings::new(context, registry),
///     RetryPolicy::default(),
///     DeviceError::is_retryable,
/// );
/// ```
pub struct Retrying<H, P> {
    inner: H,
    policy: RetryPolicy,
    retryable: P,
}

impl<H, P> Retrying<H, P> {
    /// Wrap `inner` with `policy`, retrying faults accepted by `retryable`.
    pub fn new(inner: H, policy: RetryPolicy, retryable: P) -> Self {
        Self {
            inner,
            policy,
            retryable,
        }
    }

    /// The retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<O, H, P> OperationHandler<O> for Retrying<H, P>
where
    O: Send + Sync + 'static,
    H: OperationHandler<O>,
    H::Fault: std::fmt::Display,
    P: Fn(&H::Fault) -> bool + Send + Sync + 'static,
{
    type Reply = H::Reply;
    type Fault = H::Fault;

    async fn invoke(&self, operation: &O, ctx: &EffectContext) -> Result<Self::Reply, Self::Fault> {
        let mut attempt = 1;
        loop {
            match self.inner.invoke(operation, ctx).await {
                Ok(reply) => return Ok(reply),
                Err(fault) if (self.retryable)(&fault) && self.policy.should_retry(attempt) => {
                    let backoff = self.policy.backoff_duration(attempt);
                    warn!(
                        workflow = %ctx.workflow,
                        step = ctx.step,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %fault,
                        "Bound operation failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(fault) => return Err(fault),
            }
        }
    }
}
