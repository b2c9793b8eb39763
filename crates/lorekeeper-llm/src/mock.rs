//! Scripted mock provider for deterministic testing

use crate::LlmError;
use lorekeeper_domain::{CompletionProvider, CompletionRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock LLM provider that replays scripted outcomes
///
/// Scripted replies are consumed in order, one per call. Once the script
/// is empty every call gets the fallback outcome. Clones share the script,
/// the call counter and the prompt log.
///
/// # Examples
///
/// ```
/// use lorekeeper_llm::{LlmError, MockProvider};
///
/// let provider = MockProvider::new("[]")
///     .then_error(LlmError::RateLimitExceeded("quota".into()))
///     .then_reply(r#"[{"title":"A"}]"#);
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    fallback: Result<String, LlmError>,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    model: String,
}

impl MockProvider {
    /// Create a provider that answers every call with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            fallback: Ok(response.into()),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            model: "mock".to_string(),
        }
    }

    /// Create a provider that fails every call with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            fallback: Err(error),
            ..Self::new("")
        }
    }

    /// Queue a successful reply
    pub fn then_reply(self, response: impl Into<String>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    /// Queue a failure
    pub fn then_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    /// Override the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(&self, outcome: Result<String, LlmError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }

    fn next_outcome(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.next_outcome(&request.prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest::new(prompt, 256, 0.0)
    }

    #[tokio::test]
    async fn test_fallback_response() {
        let provider = MockProvider::new("fixed");
        assert_eq!(provider.complete(&request("a")).await.unwrap(), "fixed");
        assert_eq!(provider.complete(&request("b")).await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let provider = MockProvider::new("done")
            .then_error(LlmError::RateLimitExceeded("slow down".into()))
            .then_reply("second");

        assert!(matches!(
            provider.complete(&request("1")).await,
            Err(LlmError::RateLimitExceeded(_))
        ));
        assert_eq!(provider.complete(&request("2")).await.unwrap(), "second");
        assert_eq!(provider.complete(&request("3")).await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockProvider::failing(LlmError::Other("boom".into()));
        assert!(provider.complete(&request("x")).await.is_err());
        assert!(provider.complete(&request("y")).await.is_err());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("hello")).await.unwrap();

        assert_eq!(provider2.call_count(), 1);
        assert_eq!(provider2.prompts(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_model_name() {
        let provider = MockProvider::default().with_model_name("gemini-mock");
        assert_eq!(provider.model_name(), "gemini-mock");
    }
}
