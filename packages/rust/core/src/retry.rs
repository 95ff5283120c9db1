//! Bounded retry with a fixed delay.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use storyvoice_shared::TransformConfig;
use tracing::warn;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never less than 1.
    pub max_attempts: u32,
    /// Sleep between consecutive attempts; no sleep after the last one.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl From<&TransformConfig> for RetryPolicy {
    fn from(config: &TransformConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay)
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` is reached.
///
/// The closure receives the 1-based attempt number. The last error is
/// returned on exhaustion.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "attempt failed, retrying");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
