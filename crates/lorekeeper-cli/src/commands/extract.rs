//! Extract command implementation.

use super::read_document;
use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lorekeeper_extractor::{KnowledgeExtractor, PipelineConfig};
use lorekeeper_llm::OllamaProvider;
use std::path::Path;
use tracing::info;

/// Execute the extract command.
///
/// Records go to stdout; the run summary and the availability status go to
/// stderr so the output can be piped.
pub async fn execute_extract(
    args: ExtractArgs,
    config: PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let text = read_document(&args.file)?;
    let label = match args.label {
        Some(label) => label,
        None => default_label(&args.file)?,
    };

    let provider = OllamaProvider::new(&args.endpoint, &args.model)?;
    info!("Using model '{}' at {}", args.model, provider.endpoint());
    let extractor = KnowledgeExtractor::new(provider, config)?;

    let outcome = extractor
        .extract_with_fallback(&text, &label, args.mode.into())
        .await?;

    println!("{}", formatter.format_records(&outcome.records)?);
    eprintln!("{}", formatter.outcome_summary(&outcome));
    eprintln!("{}", formatter.format_status(&extractor.status().await)?);
    Ok(())
}

fn default_label(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidInput(format!("{} has no file name", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label_is_file_name() {
        assert_eq!(default_label(Path::new("/docs/handbook.txt")).unwrap(), "handbook.txt");
        assert!(default_label(Path::new("/")).is_err());
    }
}
