//! Configuration for the extraction pipeline
//!
//! Thresholds are tuning defaults; retune them for the upstream quota in use.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum seconds between two AI calls (process-wide)
    pub min_interval_secs: u64,

    /// Consecutive rate-limit failures before the interval is widened
    pub failure_threshold: u32,

    /// Extra seconds added to the interval once `failure_threshold` is reached
    pub failure_cooldown_secs: u64,

    /// Consecutive failures at which the status check reports degradation
    pub warning_failure_threshold: u32,

    /// Consecutive failures that open the circuit breaker
    pub suspension_failure_threshold: u32,

    /// How long the breaker stays open (seconds)
    pub suspension_secs: u64,

    /// Attempts per AI call, including the first
    pub max_retries: u32,

    /// Backoff base; attempt `n` waits `base * 2^(n-1)`
    pub base_delay_secs: u64,

    /// Documents at or under this estimate are sent in one prompt
    pub single_chunk_token_limit: usize,

    /// Token budget per chunk for larger documents
    pub max_tokens_per_chunk: usize,

    /// Record count above which the deduplicator runs
    pub dedup_trigger: usize,

    /// Hard cap on returned records
    pub max_records: usize,

    /// Titles at or above this similarity are treated as duplicates
    pub similarity_threshold: f64,

    /// Shortest document accepted by the validator (characters)
    pub min_content_chars: usize,

    /// Content length kept by the manual extractor (characters)
    pub max_content_display_chars: usize,

    /// Generation cap passed to the endpoint
    pub max_output_tokens: u32,

    /// Sampling temperature passed to the endpoint
    pub temperature: f32,
}

impl Default for PipelineConfig {
    /// Defaults tuned for a free-tier quota of a few requests per minute
    fn default() -> Self {
        Self {
            min_interval_secs: 15,
            failure_threshold: 3,
            failure_cooldown_secs: 60,
            warning_failure_threshold: 10,
            suspension_failure_threshold: 15,
            suspension_secs: 2 * 60 * 60,
            max_retries: 6,
            base_delay_secs: 30,
            single_chunk_token_limit: 300_000,
            max_tokens_per_chunk: 250_000,
            dedup_trigger: 50,
            max_records: 30,
            similarity_threshold: 0.8,
            min_content_chars: 50,
            max_content_display_chars: 500,
            max_output_tokens: 8192,
            temperature: 0.3,
        }
    }
}

impl PipelineConfig {
    /// Aggressive preset: conserve a small quota with long gaps and few retries
    pub fn aggressive() -> Self {
        Self {
            min_interval_secs: 30,
            failure_cooldown_secs: 120,
            max_retries: 4,
            base_delay_secs: 60,
            single_chunk_token_limit: 100_000,
            max_tokens_per_chunk: 80_000,
            max_records: 20,
            ..Self::default()
        }
    }

    /// Lenient preset: short gaps for generous quotas or local models
    pub fn lenient() -> Self {
        Self {
            min_interval_secs: 1,
            failure_cooldown_secs: 10,
            suspension_secs: 15 * 60,
            base_delay_secs: 5,
            max_tokens_per_chunk: 8_000,
            single_chunk_token_limit: 8_000,
            max_records: 50,
            dedup_trigger: 80,
            ..Self::default()
        }
    }

    /// Minimum inter-call interval as a Duration
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }

    /// Failure cooldown as a Duration
    pub fn failure_cooldown(&self) -> Duration {
        Duration::from_secs(self.failure_cooldown_secs)
    }

    /// Breaker suspension window as a Duration
    pub fn suspension(&self) -> Duration {
        Duration::from_secs(self.suspension_secs)
    }

    /// Backoff base as a Duration
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        if self.max_tokens_per_chunk == 0 {
            return Err("max_tokens_per_chunk must be greater than 0".to_string());
        }
        if self.max_tokens_per_chunk > self.single_chunk_token_limit {
            return Err("max_tokens_per_chunk cannot exceed single_chunk_token_limit".to_string());
        }
        if self.max_records == 0 {
            return Err("max_records must be greater than 0".to_string());
        }
        if self.failure_threshold == 0 {
            return Err("failure_threshold must be greater than 0".to_string());
        }
        if !(self.failure_threshold < self.warning_failure_threshold
            && self.warning_failure_threshold < self.suspension_failure_threshold)
        {
            return Err(format!(
                "failure tiers must increase: {} < {} < {}",
                self.failure_threshold,
                self.warning_failure_threshold,
                self.suspension_failure_threshold
            ));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err("similarity_threshold must be in (0.0, 1.0]".to_string());
        }
        if self.max_content_display_chars == 0 {
            return Err("max_content_display_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    ///
    /// Missing keys take their default values.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
