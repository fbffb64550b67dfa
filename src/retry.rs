// ABOUTME: Exponential backoff retry helper with jitter and cancellation support
// ABOUTME: Retryability and delay hints come from the client error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use whoop_core::constants::retry::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, JITTER_MAX, JITTER_MIN,
};
use whoop_core::ClientResult;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each later one
    pub base_delay: Duration,
    /// Upper bound on any single delay, hints included
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    /// Same delays with a different attempt cap
    #[must_use]
    pub fn with_max_attempts(&self, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..self.clone()
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed)
    ///
    /// A hint from the error replaces the jittered exponential delay; both are capped
    /// at `max_delay`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let delay = hint.unwrap_or_else(|| {
            let exponent = attempt.saturating_sub(1).min(31);
            let jitter = rand::thread_rng().gen_range(JITTER_MIN..JITTER_MAX);
            self.base_delay
                .saturating_mul(2_u32.pow(exponent))
                .mul_f64(jitter)
        });
        delay.min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
///
/// Stops immediately when the error is not retryable, the attempt cap is reached,
/// or `cancel` has fired. Cancellation during a backoff sleep also stops the loop.
///
/// # Errors
///
/// Returns the error from the last attempt, unmodified.
pub async fn with_retry<T, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    cancel: Option<&CancellationToken>,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let cancelled = cancel.is_some_and(CancellationToken::is_cancelled);
        if attempt >= max_attempts || !error.is_retryable() || cancelled {
            debug!(attempt, retryable = error.is_retryable(), cancelled, "Giving up: {error}");
            return Err(error);
        }

        let delay = config.backoff_delay(attempt, error.retry_hint());
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Retrying after error: {error}"
        );

        if let Some(token) = cancel {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = token.cancelled() => {
                    debug!(attempt, "Retry cancelled during backoff");
                    return Err(error);
                }
            }
        } else {
            tokio::time::sleep(delay).await;
        }

        attempt += 1;
    }
}
