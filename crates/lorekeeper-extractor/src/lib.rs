//! Lorekeeper Extractor
//!
//! Turns arbitrarily large documents into a bounded set of knowledge records
//! using a quota-limited generative text endpoint.
//!
//! # Overview
//!
//! Documents are validated, split into token-budgeted chunks, and sent to the
//! AI endpoint one chunk at a time. Every call passes through a process-wide
//! [`RateGovernor`] (throttle gate and circuit breaker) and a
//! [`RetryExecutor`] that backs off on rate-limit errors. Responses are
//! parsed leniently, merged, ranked by importance and deduplicated.
//!
//! # Architecture
//!
//! ```text
//! Text → Validator → Chunker → [Governor → Retry → AI → Parser]* → Deduplicator
//!                                   │
//!                                   └─ breaker open → Manual extractor
//! ```
//!
//! # Key Features
//!
//! - **Partial success**: a failed chunk is reported, not fatal
//! - **Shared quota**: one governor per process serialises all AI calls
//! - **Lenient parsing**: record-level defects degrade to defaults
//! - **Manual fallback**: heuristic extraction that never calls the endpoint
//!
//! # Example Usage
//!
//! ```no_run
//! use lorekeeper_extractor::{ExtractionMode, KnowledgeExtractor, PipelineConfig};
//! use lorekeeper_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(r#"[{"title": "Sales", "category": "department"}]"#);
//! let extractor = KnowledgeExtractor::new(provider, PipelineConfig::default())?;
//!
//! let text = std::fs::read_to_string("handbook.txt")?;
//! let outcome = extractor
//!     .extract_with_fallback(&text, "handbook.txt", ExtractionMode::AiWithFallback)
//!     .await?;
//!
//! println!("Records: {}", outcome.records.len());
//! println!("Failed chunks: {}", outcome.failed_chunks().count());
//! println!("Status: {:?}", extractor.status().await);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod dedup;
mod error;
mod extractor;
mod fallback;
mod governor;
mod parser;
mod prompt;
mod retry;
mod tokens;
mod types;
mod validation;


pub use chunking::{Chunk, TextChunker};
pub use config::PipelineConfig;
pub use dedup::Deduplicator;
pub use error::{ExtractorError, ParseError, ValidationFailure};
pub use extractor::KnowledgeExtractor;
pub use fallback::ManualExtractor;
pub use governor::{
    Availability, CallPermit, FailureVerdict, PipelineState, PipelineStatus, RateGovernor,
    Suspension,
};
pub use parser::{parse_llm_response, UNTITLED};
pub use prompt::{PromptBuilder, PromptConfig};
pub use retry::{is_rate_limit_error, RetryExecutor};
pub use tokens::{char_budget, estimate_tokens, CHARS_PER_TOKEN};
pub use types::{ChunkFailure, ChunkReport, ExtractionMetadata, ExtractionMode, ExtractionOutcome};
pub use validation::{decode_document, validate_content};
