//! Prompt construction for knowledge extraction

use lorekeeper_domain::CompletionRequest;

/// Per-call prompt parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    /// Generation cap passed to the endpoint
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Document label shown to the model
    pub label: String,

    /// 1-based chunk position (`None` for single-prompt documents)
    pub chunk_index: Option<usize>,

    /// Total chunk count (`None` for single-prompt documents)
    pub chunk_total: Option<usize>,
}

impl PromptConfig {
    /// Parameters for a document sent in one prompt
    pub fn whole_document(label: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            label: label.into(),
            chunk_index: None,
            chunk_total: None,
        }
    }

    /// Same parameters scoped to chunk `index` of `total`
    pub fn for_chunk(&self, index: usize, total: usize) -> Self {
        Self {
            chunk_index: Some(index),
            chunk_total: Some(total),
            ..self.clone()
        }
    }
}

/// Builds extraction prompts
pub struct PromptBuilder<'a> {
    config: &'a PromptConfig,
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(config: &'a PromptConfig, text: &'a str) -> Self {
        Self { config, text }
    }

    /// Build the prompt text
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(self.text.len() + 2048);

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Document: {}\n", self.config.label));
        if let (Some(index), Some(total)) = (self.config.chunk_index, self.config.chunk_total) {
            prompt.push_str(&format!(
                "This is part {} of {} of the document. Extract only what appears in this part.\n",
                index, total
            ));
        }
        prompt.push('\n');

        prompt.push_str("Text to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }

    /// Build the full completion request
    pub fn request(&self) -> CompletionRequest {
        CompletionRequest::new(self.build(), self.config.max_tokens, self.config.temperature)
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are building an internal knowledge base from company documents.
Extract the distinct pieces of organisational knowledge in the text below.

Each item must have exactly these fields:
- "title": a short label (under 50 characters)
- "content": a self-contained explanation drawn from the text
- "category": one of "department", "position", "terminology", "procedure", "regulation"
- "keywords": an array of up to 5 short search terms
- "importance": one of "high", "medium", "low"

Rules:
- One topic per item; do not repeat the same topic under different titles
- Use "department" for organisational units, "position" for roles and titles,
  "procedure" for step-by-step workflows, "regulation" for rules and policies,
  and "terminology" for everything else
- Mark items "high" only when the text presents them as core or mandatory"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON array only, no additional text):
[
  {
    "title": "...",
    "content": "...",
    "category": "terminology",
    "keywords": ["...", "..."],
    "importance": "medium"
  }
]

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text_and_label() {
        let config = PromptConfig::whole_document("handbook.txt", 4096, 0.2);
        let prompt =
            PromptBuilder::new(&config, "The sales department reports to the COO.").build();

        assert!(prompt.contains("Document: handbook.txt"));
        assert!(prompt.contains("The sales department reports to the COO."));
        assert!(!prompt.contains("This is part"));
    }

    #[test]
    fn test_prompt_names_every_field() {
        let config = PromptConfig::whole_document("doc", 4096, 0.2);
        let prompt = PromptBuilder::new(&config, "text").build();

        for field in [
            "\"title\"",
            "\"content\"",
            "\"category\"",
            "\"keywords\"",
            "\"importance\"",
        ] {
            assert!(prompt.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_chunk_prompt_embeds_position() {
        let base = PromptConfig::whole_document("manual", 4096, 0.2);
        let config = base.for_chunk(3, 7);
        let prompt = PromptBuilder::new(&config, "chunk body").build();

        assert!(prompt.contains("part 3 of 7"));
        assert_eq!(config.label, "manual");
    }

    #[test]
    fn test_request_carries_generation_parameters() {
        let config = PromptConfig::whole_document("doc", 1234, 0.7);
        let request = PromptBuilder::new(&config, "text").request();

        assert_eq!(request.max_output_tokens, 1234);
        assert_eq!(request.temperature, 0.7);
        assert!(request.prompt.contains("text"));
    }
}
