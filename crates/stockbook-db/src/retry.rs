//! # Busy Retry
//!
//! Re-runs an operation that failed only because a lock was not acquired in
//! time.
//!
//! ## Retry Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt 1 ──► Err(Busy) ──► sleep 50ms  ─┐                             │
//! │  attempt 2 ──► Err(Busy) ──► sleep 100ms ─┤  (exponential, capped)      │
//! │  attempt 3 ──► Ok(sale)  ◄────────────────┘                             │
//! │                                                                         │
//! │  Err(InsufficientStock) ──► returned immediately, never retried         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each attempt must be a whole operation (a full `process_sale` call), never
//! the tail of a half-finished transaction. Every service in this crate rolls
//! back before returning `Busy`, so that is always the case here.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerResult;

/// How `Busy` failures are retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first. 1 disables retrying.
    pub max_attempts: u32,

    /// First wait (milliseconds).
    pub initial_backoff_ms: u64,

    /// Longest single wait (milliseconds).
    pub max_backoff_ms: u64,

    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 50,
            max_backoff_ms: 2_000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the operation exactly once.
    pub fn no_retry() -> Self {
        RetryPolicy {
            max_attempts: 1,
            ..Default::default()
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.initial_backoff_ms),
            max_interval: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
            // Attempts are bounded by max_attempts instead.
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
///
/// ## Example
/// ```rust,ignore
/// let processor = db.processor();
/// let done = retry_on_busy(&policy, || processor.process_sale(request.clone())).await?;
/// ```
pub async fn retry_on_busy<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> LedgerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LedgerResult<T>>,
{
    let mut backoff = policy.create_backoff();
    // Starts current_interval at initial_interval.
    backoff.reset();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let Some(wait) = backoff.next_backoff() else {
                    return Err(err);
                };

                warn!(attempt, max_attempts, ?wait, error = %err, "Database busy, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(err) => {
                if err.is_retryable() {
                    debug!(attempt, "Retry attempts exhausted");
                }
                return Err(err);
            }
        }
    }
}
