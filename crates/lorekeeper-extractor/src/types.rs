//! Result types for document extraction

use crate::error::ParseError;
use crate::governor::Suspension;
use lorekeeper_domain::KnowledgeRecord;
use thiserror::Error;

/// Which extraction path to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// AI only; an open breaker is reported to the caller
    Ai,

    /// Heuristic extraction only, never calls the endpoint
    Manual,

    /// AI first, heuristic extraction for whatever the AI path could not cover
    #[default]
    AiWithFallback,
}

impl ExtractionMode {
    /// Parse `ai`, `manual` or `auto` (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ai" => Some(Self::Ai),
            "manual" => Some(Self::Manual),
            "auto" | "fallback" => Some(Self::AiWithFallback),
            _ => None,
        }
    }
}

/// Result of processing one document
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Final records, ranked and capped
    pub records: Vec<KnowledgeRecord>,

    /// Per-chunk outcomes in document order
    pub chunks: Vec<ChunkReport>,

    /// Set when the breaker opened part-way through the document
    pub interrupted: Option<Suspension>,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,
}

impl ExtractionOutcome {
    /// Chunks whose AI call or parse failed
    pub fn failed_chunks(&self) -> impl Iterator<Item = &ChunkReport> {
        self.chunks.iter().filter(|c| c.outcome.is_err())
    }

    /// True when every chunk produced records
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none() && self.chunks.iter().all(|c| c.outcome.is_ok())
    }
}

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    /// 1-based chunk position
    pub index: usize,

    /// Number of chunks in the document
    pub total: usize,

    /// Record count on success
    pub outcome: Result<usize, ChunkFailure>,
}

/// Why a chunk contributed no records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkFailure {
    /// The AI call failed (retries exhausted or a non-retryable endpoint error)
    #[error("AI call failed: {0}")]
    Retry(String),

    /// The response held no usable JSON array
    #[error("unparseable response: {0}")]
    Parse(ParseError),

    /// Not attempted because the breaker was open
    #[error("skipped (circuit open)")]
    Skipped,
}

/// Metadata about an extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMetadata {
    /// Document label
    pub source_label: String,

    /// Unix seconds when the run finished
    pub timestamp: u64,

    /// Model that served the AI calls
    pub model_name: String,

    /// Estimated tokens in the document
    pub total_tokens: usize,

    /// Number of chunks (1 for single-prompt documents)
    pub chunk_count: usize,

    /// Records collected before ranking and deduplication
    pub records_before_dedup: usize,

    /// Records returned
    pub records_after_dedup: usize,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(ExtractionMode::parse("AI"), Some(ExtractionMode::Ai));
        assert_eq!(ExtractionMode::parse("manual"), Some(ExtractionMode::Manual));
        assert_eq!(ExtractionMode::parse(" auto "), Some(ExtractionMode::AiWithFallback));
        assert_eq!(ExtractionMode::parse("cloud"), None);
    }

    #[test]
    fn test_chunk_failure_display() {
        assert_eq!(ChunkFailure::Skipped.to_string(), "skipped (circuit open)");
        assert!(ChunkFailure::Parse(ParseError::Format).to_string().contains("format"));
    }
}
