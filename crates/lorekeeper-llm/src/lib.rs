//! Lorekeeper LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `lorekeeper-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted, deterministic provider for tests
//! - `OllamaProvider`: Local Ollama API integration
//!
//! Providers make exactly one upstream call per `complete`. Retrying,
//! throttling and circuit breaking belong to the extractor pipeline.
//!
//! # Examples
//!
//! ```
//! use lorekeeper_llm::MockProvider;
//! use lorekeeper_domain::{CompletionProvider, CompletionRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("[]");
//! let request = CompletionRequest::new("extract", 1024, 0.2);
//! assert_eq!(provider.complete(&request).await.unwrap(), "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;

use thiserror::Error;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Upstream rejected the call for quota reasons (HTTP 429)
    #[error("Rate limit exceeded (HTTP 429): {0}")]
    RateLimitExceeded(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}
