//! Validate command implementation.

use super::read_document;
use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::output::Formatter;
use lorekeeper_extractor::{
    estimate_tokens, validate_content, ExtractorError, PipelineConfig, TextChunker,
};

/// Execute the validate command.
pub fn execute_validate(
    args: ValidateArgs,
    config: &PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let text = read_document(&args.file)?;
    let report = check(&text, config)?;

    println!(
        "{}",
        formatter.success(&format!(
            "{}: ~{} tokens, {} chunk(s)",
            args.file.display(),
            report.tokens,
            report.chunks
        ))
    );
    Ok(())
}

struct Report {
    tokens: usize,
    chunks: usize,
}

fn check(text: &str, config: &PipelineConfig) -> std::result::Result<Report, ExtractorError> {
    validate_content(text, config.min_content_chars)?;

    let tokens = estimate_tokens(text);
    let chunks = if tokens <= config.single_chunk_token_limit {
        1
    } else {
        TextChunker::new(config.max_tokens_per_chunk).chunk(text).len()
    };
    Ok(Report { tokens, chunks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliFormat;
    use crate::error::CliError;
    use lorekeeper_extractor::ValidationFailure;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rejection(bytes: &[u8]) -> Option<ValidationFailure> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        let args = ValidateArgs {
            file: file.path().to_path_buf(),
        };
        let formatter = Formatter::new(CliFormat::Table, false);

        match execute_validate(args, &PipelineConfig::default(), &formatter) {
            Err(CliError::Extractor(ExtractorError::Validation(failure))) => Some(failure),
            _ => None,
        }
    }

    #[test]
    fn test_pdf_file_reaches_validator() {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend((0x80..=0xFFu8).cycle().take(300));
        bytes.extend_from_slice(b"\nendobj\n");

        assert_eq!(
            rejection(&bytes),
            Some(ValidationFailure::UnsupportedContainer("%PDF-"))
        );
    }

    #[test]
    fn test_binary_file_reports_encoding_problem() {
        let bytes: Vec<u8> = (0x80..=0xFFu8).cycle().take(300).collect();
        assert_eq!(rejection(&bytes), Some(ValidationFailure::EncodingProblem));
    }

    #[test]
    fn test_plain_text_file_passes() {
        let text = "Line one of a plain text document, long enough to matter.\n".repeat(3);
        assert_eq!(rejection(text.as_bytes()), None);
    }

    #[test]
    fn test_check_counts_chunks() {
        let config = PipelineConfig {
            single_chunk_token_limit: 20,
            max_tokens_per_chunk: 20,
            ..PipelineConfig::default()
        };
        let text = "Line one of a plain text document, long enough to matter.\n".repeat(3);

        let report = check(&text, &config).unwrap();

        assert_eq!(report.tokens, estimate_tokens(&text));
        assert_eq!(report.chunks, 3);
    }

    #[test]
    fn test_check_rejects_short_text() {
        let result = check("tiny", &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(ExtractorError::Validation(ValidationFailure::TooShort { length: 4, .. }))
        ));
    }
}
