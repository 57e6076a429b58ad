//! Fixed-interval polling until a readiness predicate holds
//!
//! The suspension point is supplied by the caller as a `sleep` function so the
//! same primitive runs on a tokio timer in tests and on `setTimeout` in the
//! browser.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::trace;

use crate::error::CollectorError;

/// Default delay between readiness checks
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// How often, and how many times, to re-check readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay between checks
    pub interval: Duration,
    /// Maximum number of checks; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever at a fixed interval
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_RETRY_INTERVAL)
    }
}

/// Run `action` once `ready` returns true, sleeping `policy.interval` between checks
///
/// The predicate is checked immediately; no sleep happens when it already holds.
///
/// # Errors
///
/// Returns [`CollectorError::RetryExhausted`] only when the policy has a
/// `max_attempts` bound and every check failed.
pub async fn poll_until_ready<T, R, A, S, Fut>(
    policy: &RetryPolicy,
    mut ready: R,
    action: A,
    mut sleep: S,
) -> Result<T, CollectorError>
where
    R: FnMut() -> bool,
    A: FnOnce() -> T,
    S: FnMut(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if ready() {
            trace!(attempts, "ready");
            return Ok(action());
        }
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(CollectorError::RetryExhausted { attempts });
            }
        }
        trace!(attempts, interval_ms = policy.interval.as_millis() as u64, "not ready, retrying");
        sleep(policy.interval).await;
    }
}
