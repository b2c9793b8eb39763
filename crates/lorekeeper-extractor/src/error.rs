//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Document rejected before any AI call
    #[error("Validation error: {0}")]
    Validation(ValidationFailure),

    /// Circuit breaker is open; no AI calls until the suspension ends
    #[error("AI endpoint suspended for {remaining_secs}s after {consecutive_failures} consecutive rate-limit failures")]
    CircuitOpen {
        /// Unix seconds at which calls resume
        until: u64,
        /// Seconds left in the suspension window
        remaining_secs: u64,
        /// Failure count that tripped the breaker
        consecutive_failures: u32,
    },

    /// Every attempt was rate limited
    #[error("Gave up after {attempts} rate-limited attempts: {last_error}")]
    RetriesExhausted {
        /// Number of calls made
        attempts: u32,
        /// Message of the final failure
        last_error: String,
    },

    /// Non rate-limit endpoint failure (never retried)
    #[error("Endpoint error: {0}")]
    Endpoint(String),

    /// AI output could not be turned into records
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Document-level defects in an AI response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `[` ... `]` pair in the response
    #[error("format: no JSON array brackets in response")]
    Format,

    /// Bracketed text is not valid JSON
    #[error("malformed json: {0}")]
    MalformedJson(String),

    /// Valid JSON but not an array
    #[error("not an array")]
    NotAnArray,
}

/// Why the content validator rejected a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Empty or below the minimum length
    #[error("too short ({length} chars, need {min})")]
    TooShort {
        /// Characters found
        length: usize,
        /// Characters required
        min: usize,
    },

    /// Control characters above the allowed ratio
    #[error("binary/corrupt content")]
    BinaryOrCorrupt,

    /// Too many characters outside the prose allow-list
    #[error("encoding problem")]
    EncodingProblem,

    /// A known binary container signature was found
    #[error("unsupported container format (found {0:?})")]
    UnsupportedContainer(&'static str),
}

impl From<ValidationFailure> for ExtractorError {
    fn from(failure: ValidationFailure) -> Self {
        ExtractorError::Validation(failure)
    }
}

impl ExtractorError {
    /// True when the error means the AI path is unavailable right now
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ExtractorError::CircuitOpen { .. })
    }
}
