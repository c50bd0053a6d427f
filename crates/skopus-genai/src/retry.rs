//! Retry policy for generation calls.
//!
//! Transient failures (network errors, 429, 5xx) are retried with exponential
//! back-off and jitter. Everything else is returned immediately: a blocked
//! prompt or an unparseable body will not improve on a second attempt, and
//! every attempt is billed.

use std::future::Future;
use std::time::Duration;

use crate::error::GenAiError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 429 and 5xx responses.
///
/// **Not retriable:**
/// - Any other status, [`GenAiError::Blocked`], [`GenAiError::EmptyResponse`],
///   [`GenAiError::Deserialize`] and [`GenAiError::InvalidBaseUrl`].
pub(crate) fn is_retriable(err: &GenAiError) -> bool {
    match err {
        GenAiError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GenAiError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        GenAiError::Blocked { .. }
        | GenAiError::EmptyResponse { .. }
        | GenAiError::Deserialize { .. }
        | GenAiError::InvalidBaseUrl { .. } => false,
    }
}

/// Status code carried by `err`, if any.
fn status_of(err: &GenAiError) -> Option<u16> {
    match err {
        GenAiError::UnexpectedStatus { status, .. } => Some(*status),
        GenAiError::Http(e) => e.status().map(|s| s.as_u16()),
        _ => None,
    }
}

/// How many times, and how patiently, a failed generation call is retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    ///
    /// With `backoff_base_ms = 1_000` the schedule is 1 s, 2 s, 4 s, ...
    /// A 429 waits twice the nominal delay. Capped at 30 s.
    pub(crate) fn nominal_delay_ms(&self, attempt: u32, err: &GenAiError) -> u64 {
        let exponent = attempt.saturating_sub(1).min(10);
        let mut delay = self.backoff_base_ms.saturating_mul(1u64 << exponent);
        if status_of(err) == Some(429) {
            delay = delay.saturating_mul(2);
        }
        delay.min(MAX_DELAY_MS)
    }

    /// Runs `call` against `model`, retrying transient failures.
    pub(crate) async fn run<T, F, Fut>(&self, model: &str, mut call: F) -> Result<T, GenAiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenAiError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(model, retries = attempt, "generation call recovered");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !is_retriable(&err) {
                return Err(err);
            }
            if attempt >= self.max_retries {
                if attempt > 0 {
                    tracing::warn!(model, retries = attempt, error = %err, "generation retries exhausted");
                }
                return Err(err);
            }

            attempt += 1;
            let delay_ms = jitter(self.nominal_delay_ms(attempt, &err));
            tracing::warn!(
                model,
                attempt,
                max_retries = self.max_retries,
                status = status_of(&err),
                delay_ms,
                error = %err,
                "generation call failed transiently, backing off"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}

/// Spreads `delay_ms` uniformly over ±25 %.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jitter(delay_ms: u64) -> u64 {
    (delay_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}
