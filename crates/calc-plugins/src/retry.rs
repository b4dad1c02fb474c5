//! Per-attempt deadline and bounded retry for host calls.

use calc_core::{ClientConfig, Error, PipelineOperation, Result, RetryPolicy};
use std::future::Future;
use std::time::Duration;

/// How a single pipeline call is attempted.
///
/// # Examples
///
/// ```
/// use calc_core::ClientConfig;
/// use calc_plugins::CallPolicy;
/// use std::time::Duration;
///
/// let policy = CallPolicy::from_config(&ClientConfig::default());
/// assert_eq!(policy.deadline, Duration::from_secs(10));
/// assert_eq!(policy.once().retry.max_attempts, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Retry policy applied to transient failures
    pub retry: RetryPolicy,
    /// Deadline for each individual attempt
    pub deadline: Duration,
}

impl CallPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(retry: RetryPolicy, deadline: Duration) -> Self {
        Self { retry, deadline }
    }

    /// Builds the policy described by the client configuration.
    #[must_use]
    pub const fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.retry, config.host.request_timeout())
    }

    /// Same deadline, single attempt.
    #[must_use]
    pub const fn once(self) -> Self {
        Self::new(RetryPolicy::no_retry(), self.deadline)
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Runs `call` under the policy.
///
/// Each attempt is bounded by `policy.deadline`; expiry becomes
/// [`Error::Timeout`]. Transient failures (see [`Error::is_transient`]) are
/// retried with exponential backoff until `max_attempts` is reached. Any
/// other error is returned immediately.
///
/// # Errors
///
/// Returns the error of the last attempt.
pub async fn with_retry<T, F, Fut>(
    operation: PipelineOperation,
    policy: CallPolicy,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let outcome = tokio::time::timeout(policy.deadline, call())
            .await
            .unwrap_or_else(|_| {
                Err(Error::Timeout {
                    operation: operation.to_string(),
                    duration: policy.deadline,
                })
            });

        match outcome {
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.retry.backoff_for(attempt);
                tracing::warn!(
                    %operation,
                    attempt,
                    max_attempts,
                    ?delay,
                    error = %err,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
