//! Ollama Provider Implementation
//!
//! Sends completion requests to a local Ollama instance.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama generate API
//! - Per-request timeout (the pipeline has no timeout layer of its own)
//! - HTTP 429 mapped to `LlmError::RateLimitExceeded` so the retry
//!   executor can recognise quota exhaustion
//!
//! # Examples
//!
//! ```no_run
//! use lorekeeper_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3")
//!     .expect("client");
//! ```

use crate::LlmError;
use lorekeeper_domain::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single completion (5 minutes; large chunks are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the default timeout
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with a custom request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    /// Create a provider pointed at `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Endpoint this provider talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_output_tokens,
            },
        };

        debug!("POST {} ({} prompt chars)", url, request.prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let parsed: OllamaGenerateResponse = response
                .json()
                .await
                .map_err(|e| {
                    LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
            return Ok(parsed.response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded(error_text),
            reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
            _ => LlmError::Communication(format!("HTTP {}: {}", status, error_text)),
        })
    }
}

impl CompletionProvider for OllamaProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.generate(request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434");
        assert_eq!(provider.model_name(), "llama3");
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_request_body_carries_generation_options() {
        let body = OllamaGenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: 2048,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["options"]["num_predict"], 2048);
        assert_eq!(json["stream"], false);
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Port 9 (discard) is not an Ollama server
        let provider = OllamaProvider::with_timeout(
            "http://127.0.0.1:9",
            "llama3",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = provider
            .complete(&CompletionRequest::new("test", 16, 0.0))
            .await;

        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Requires a running Ollama instance
    #[tokio::test]
    #[ignore]
    async fn test_ollama_generate_integration() {
        let provider = OllamaProvider::default_endpoint("llama3").unwrap();
        let result = provider
            .complete(&CompletionRequest::new("Say 'hello' and nothing else", 16, 0.0))
            .await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
