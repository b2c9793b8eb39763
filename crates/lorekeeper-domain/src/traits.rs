//! Trait definitions for external interactions
//!
//! The generative text endpoint is the only collaborator the pipeline calls.
//! Implementations live in `lorekeeper-llm`.

use std::fmt::Display;
use std::future::Future;

/// A single generation request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full prompt text
    pub prompt: String,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a request with the given prompt and generation parameters
    pub fn new(prompt: impl Into<String>, max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
            temperature,
        }
    }
}

/// Trait for generative text endpoints
///
/// A call may fail, time out, or be rejected for quota reasons. Callers
/// classify failures by inspecting the error's `Display` output, so
/// implementations should keep status codes and upstream messages in it.
pub trait CompletionProvider: Send + Sync {
    /// Error type for completion calls
    type Error: Display + Send;

    /// Generate a completion for the request
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Name of the model behind this provider
    fn model_name(&self) -> &str;
}
