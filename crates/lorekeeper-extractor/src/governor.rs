//! Process-wide throttle gate and circuit breaker
//!
//! `RateGovernor` owns the shared `PipelineState`. One governor should be
//! shared (via `Arc`) by every extractor in the process; all reads and
//! writes of the state go through its mutex, so two documents processed
//! concurrently can never both claim the same throttle window.
//!
//! Calls are admitted one at a time. A caller holds a [`CallPermit`] from
//! the moment its slot is granted until the call finishes, and the next
//! slot is measured from that finish.

use crate::config::PipelineConfig;
use lorekeeper_domain::record::unix_now;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Mutable state shared by every AI call in the process
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Start of the call in flight, or the end of the last finished call
    pub last_request: Option<Instant>,

    /// Rate-limit failures since the last success
    pub consecutive_failures: u32,

    /// Breaker is open until this instant
    pub suspended_until: Option<Instant>,
}

/// Details of an open breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suspension {
    /// Unix seconds at which calls resume
    pub until: u64,

    /// Time left in the window
    pub remaining: Duration,

    /// Failure count recorded when the breaker tripped
    pub consecutive_failures: u32,
}

impl Suspension {
    fn from_deadline(deadline: Instant, consecutive_failures: u32) -> Self {
        let remaining = deadline.saturating_duration_since(Instant::now());
        Self {
            until: unix_now() + remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0),
            remaining,
            consecutive_failures,
        }
    }

    /// Human-readable reason for status displays
    pub fn reason(&self) -> String {
        format!(
            "suspended after {} consecutive rate-limit failures; retry in {} min",
            self.consecutive_failures,
            self.remaining.as_secs().div_ceil(60)
        )
    }
}

/// Result of a breaker check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Calls may proceed
    Available,

    /// Calls are blocked
    Suspended(Suspension),
}

/// What a recorded rate-limit failure led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Caller may back off and retry
    Retry {
        /// Failure count after this failure
        consecutive_failures: u32,
    },

    /// This failure tripped the breaker
    Suspended(Suspension),
}

/// Snapshot returned by the availability status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    /// Whether an AI call would be attempted right now
    pub available: bool,

    /// Why the pipeline is suspended or degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Unix seconds at which a suspension ends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<u64>,

    /// Rate-limit failures since the last success
    pub consecutive_failures: u32,
}

/// Throttle gate and circuit breaker over one `PipelineState`
#[derive(Debug)]
pub struct RateGovernor {
    min_interval: Duration,
    failure_threshold: u32,
    failure_cooldown: Duration,
    warning_threshold: u32,
    suspension_threshold: u32,
    suspension: Duration,
    state: Mutex<PipelineState>,
    call_gate: Mutex<()>,
}

/// Admission to make one AI call
///
/// Holding it keeps every other caller at the gate. Hand it back with
/// [`CallPermit::complete`] once the call returns; a permit dropped
/// without completing leaves the call's start as the interval origin.
#[derive(Debug)]
pub struct CallPermit<'a> {
    governor: &'a RateGovernor,
    _gate: MutexGuard<'a, ()>,
}

impl CallPermit<'_> {
    /// Mark the call finished; the next interval counts from now
    pub async fn complete(self) {
        self.governor.state.lock().await.last_request = Some(Instant::now());
    }
}

impl RateGovernor {
    /// Create a governor from the pipeline configuration
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            min_interval: config.min_interval(),
            failure_threshold: config.failure_threshold,
            failure_cooldown: config.failure_cooldown(),
            warning_threshold: config.warning_failure_threshold,
            suspension_threshold: config.suspension_failure_threshold,
            suspension: config.suspension(),
            state: Mutex::new(PipelineState::default()),
            call_gate: Mutex::new(()),
        }
    }

    /// Wait until the next call is permitted
    ///
    /// The breaker is checked each time the caller wakes, so a suspension
    /// opened by another document during the wait blocks this call too.
    /// The state lock is released while sleeping, so status checks never
    /// block behind a waiting caller.
    pub async fn acquire(&self) -> Result<CallPermit<'_>, Suspension> {
        let gate = self.call_gate.lock().await;
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                if let Availability::Suspended(suspension) = self.check_locked(&mut state) {
                    return Err(suspension);
                }

                let now = Instant::now();
                let interval = self.effective_interval(state.consecutive_failures);
                let slot = state.last_request.map_or(now, |last| last + interval);
                if slot <= now {
                    state.last_request = Some(now);
                    return Ok(CallPermit {
                        governor: self,
                        _gate: gate,
                    });
                }
                slot - now
            };

            debug!("Throttle gate: waiting {:?} before next AI call", wait);
            sleep(wait).await;
        }
    }

    /// Check whether the breaker allows a call
    ///
    /// An expired suspension is cleared here, resetting the failure count.
    pub async fn check_available(&self) -> Availability {
        let mut state = self.state.lock().await;
        self.check_locked(&mut state)
    }

    /// Record a successful call
    pub async fn record_success(&self) {
        let mut state = self.state.lock().await;
        if state.consecutive_failures > 0 {
            info!(
                "AI call succeeded; clearing {} consecutive failures",
                state.consecutive_failures
            );
        }
        state.consecutive_failures = 0;
    }

    /// Record a rate-limit failure and decide whether the breaker opens
    pub async fn record_failure(&self) -> FailureVerdict {
        let mut state = self.state.lock().await;
        state.consecutive_failures += 1;
        let failures = state.consecutive_failures;

        if failures >= self.suspension_threshold {
            let deadline = Instant::now() + self.suspension;
            state.suspended_until = Some(deadline);
            error!(
                "Circuit breaker opened after {} consecutive rate-limit failures ({:?} suspension)",
                failures, self.suspension
            );
            return FailureVerdict::Suspended(Suspension::from_deadline(deadline, failures));
        }

        if failures == self.warning_threshold {
            warn!("{} consecutive rate-limit failures; quota is likely exhausted", failures);
        } else if failures == self.failure_threshold {
            warn!(
                "{} consecutive rate-limit failures; widening call interval by {:?}",
                failures, self.failure_cooldown
            );
        }

        FailureVerdict::Retry {
            consecutive_failures: failures,
        }
    }

    /// Availability status for pollers
    pub async fn status(&self) -> PipelineStatus {
        let mut state = self.state.lock().await;
        match self.check_locked(&mut state) {
            Availability::Suspended(suspension) => PipelineStatus {
                available: false,
                reason: Some(suspension.reason()),
                suspended_until: Some(suspension.until),
                consecutive_failures: state.consecutive_failures,
            },
            Availability::Available => {
                let failures = state.consecutive_failures;
                let reason = (failures >= self.warning_threshold).then(|| {
                    format!("degraded: {} consecutive rate-limit failures", failures)
                });
                PipelineStatus {
                    available: true,
                    reason,
                    suspended_until: None,
                    consecutive_failures: failures,
                }
            }
        }
    }

    /// Current failure count
    pub async fn consecutive_failures(&self) -> u32 {
        self.state.lock().await.consecutive_failures
    }

    /// Clear all state (operator override)
    pub async fn reset(&self) {
        *self.state.lock().await = PipelineState::default();
        info!("Pipeline state reset");
    }

    fn effective_interval(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures >= self.failure_threshold {
            self.min_interval + self.failure_cooldown
        } else {
            self.min_interval
        }
    }

    fn check_locked(&self, state: &mut PipelineState) -> Availability {
        let Some(deadline) = state.suspended_until else {
            return Availability::Available;
        };

        if Instant::now() < deadline {
            return Availability::Suspended(Suspension::from_deadline(
                deadline,
                state.consecutive_failures,
            ));
        }

        info!("Suspension window elapsed; circuit breaker closed");
        state.suspended_until = None;
        state.consecutive_failures = 0;
        Availability::Available
    }
}
