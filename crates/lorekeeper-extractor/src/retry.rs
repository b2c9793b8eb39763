//! Retry executor with exponential backoff for rate-limited AI calls

use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::governor::{FailureVerdict, RateGovernor, Suspension};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Lower-cased substrings that mark an error as quota/rate related
const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "ratelimit",
    "rate_limit",
    "too many requests",
    "resource exhausted",
    "resource_exhausted",
    "quota",
];

/// True when an endpoint error message signals rate limiting or quota exhaustion
pub fn is_rate_limit_error(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lowered.contains(m))
}

impl From<Suspension> for ExtractorError {
    fn from(suspension: Suspension) -> Self {
        ExtractorError::CircuitOpen {
            until: suspension.until,
            remaining_secs: suspension.remaining.as_secs(),
            consecutive_failures: suspension.consecutive_failures,
        }
    }
}

/// Runs AI calls through the breaker and throttle, retrying rate-limit failures
pub struct RetryExecutor {
    governor: Arc<RateGovernor>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryExecutor {
    /// Create an executor with explicit retry settings
    pub fn new(governor: Arc<RateGovernor>, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            governor,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// Create an executor from the pipeline configuration
    pub fn from_config(governor: Arc<RateGovernor>, config: &PipelineConfig) -> Self {
        Self::new(governor, config.max_retries, config.base_delay())
    }

    /// Backoff before the attempt following `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Execute `operation` until it succeeds, fails hard, or attempts run out
    ///
    /// Rate-limit failures are retried after `base * 2^(attempt-1)`. Any
    /// other failure is returned immediately as `ExtractorError::Endpoint`.
    /// An open breaker, at the moment a slot is granted or tripped by an
    /// attempt, yields `ExtractorError::CircuitOpen`.
    ///
    /// Every rate-limited attempt is recorded against the breaker, so a
    /// call that exhausts its retries adds `max_retries` to the consecutive
    /// failure count rather than one.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, ExtractorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            let permit = match self.governor.acquire().await {
                Ok(permit) => permit,
                Err(suspension) => {
                    debug!("Skipping AI call: {}", suspension.reason());
                    return Err(suspension.into());
                }
            };

            let result = operation().await;
            permit.complete().await;

            let error = match result {
                Ok(value) => {
                    self.governor.record_success().await;
                    return Ok(value);
                }
                Err(e) => e.to_string(),
            };

            if !is_rate_limit_error(&error) {
                warn!("AI call failed (not retried): {}", error);
                return Err(ExtractorError::Endpoint(error));
            }

            match self.governor.record_failure().await {
                FailureVerdict::Suspended(suspension) => return Err(suspension.into()),
                FailureVerdict::Retry {
                    consecutive_failures,
                } => {
                    if attempt < self.max_retries {
                        let delay = self.backoff_delay(attempt);
                        warn!(
                            "Rate limited (attempt {}/{}, {} consecutive); backing off {:?}",
                            attempt, self.max_retries, consecutive_failures, delay
                        );
                        sleep(delay).await;
                    }
                }
            }

            last_error = error;
        }

        Err(ExtractorError::RetriesExhausted {
            attempts: self.max_retries,
            last_error,
        })
    }
}
