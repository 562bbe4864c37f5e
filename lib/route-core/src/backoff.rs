//! Bounded exponential backoff
//!
//! The policy is a plain value handed to whoever retries; there is no
//! process-wide backoff state.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Exponential backoff configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt (ms)
    pub initial_ms: u64,
    /// Multiplier applied to the delay after each failure
    pub factor: f64,
    /// Maximum number of attempts
    pub steps: u32,
    /// Each delay grows by up to `jitter * delay`; 0 disables jitter
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_ms: 4_000,
            factor: 2.0,
            steps: 3,
            jitter: 1.0,
        }
    }
}

impl BackoffPolicy {
    /// Delay before attempt `retry + 1`, without jitter
    pub fn base_delay(&self, retry: u32) -> Duration {
        let ms = self.initial_ms as f64 * self.factor.powi(retry as i32);
        Duration::from_millis(ms as u64)
    }

    fn jittered_delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter <= 0.0 {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0.0..1.0) * self.jitter;
        base + Duration::from_secs_f64(base.as_secs_f64() * extra)
    }
}

/// Outcome of a single attempt
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Stop retrying and return this value
    Done(T),
    /// Back off and try again
    Retry(E),
}

/// Run `attempt` until it is done or the policy runs out of steps
///
/// Sleeps only between attempts. Returns the last error on exhaustion.
/// A policy with zero steps still makes one attempt.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &BackoffPolicy,
    operation_name: &str,
    mut attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
    E: fmt::Display,
{
    let steps = policy.steps.max(1);
    let mut retry = 0u32;

    loop {
        match attempt().await {
            Attempt::Done(value) => return Ok(value),
            Attempt::Retry(e) => {
                if retry + 1 >= steps {
                    error!(
                        operation = %operation_name,
                        attempts = retry + 1,
                        error = %e,
                        "Operation failed after max retries"
                    );
                    return Err(e);
                }

                let delay = policy.jittered_delay(retry);
                warn!(
                    operation = %operation_name,
                    attempt = retry + 1,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
        }
    }
}
