//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use lorekeeper_extractor::{ExtractionMode, PipelineConfig};
use lorekeeper_llm::ollama::DEFAULT_ENDPOINT;
use std::path::PathBuf;

/// Lorekeeper CLI - Turn documents into knowledge records.
#[derive(Debug, Parser)]
#[command(name = "lorekeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true, env = "LOREKEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract knowledge records from a document
    Extract(ExtractArgs),

    /// Check that a document would be accepted, and how it would be chunked
    Validate(ValidateArgs),

    /// Print a pipeline configuration as TOML
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to read
    pub file: PathBuf,

    /// Label recorded as the source of every record (defaults to the file name)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Extraction path
    #[arg(short, long, value_enum, default_value = "auto")]
    pub mode: ModeArg,

    /// Ollama endpoint
    #[arg(long, env = "LOREKEEPER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Model name
    #[arg(long, env = "LOREKEEPER_MODEL", default_value = "llama3.2")]
    pub model: String,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Document to check
    pub file: PathBuf,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Preset to print
    #[arg(short, long, value_enum, default_value = "default")]
    pub preset: PresetArg,
}

/// Extraction mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// AI only
    Ai,
    /// Heuristics only, no AI calls
    Manual,
    /// AI, falling back to heuristics when the endpoint is suspended
    Auto,
}

impl From<ModeArg> for ExtractionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Ai => ExtractionMode::Ai,
            ModeArg::Manual => ExtractionMode::Manual,
            ModeArg::Auto => ExtractionMode::AiWithFallback,
        }
    }
}

/// Configuration preset argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetArg {
    /// Free-tier defaults
    Default,
    /// Conserve a small quota
    Aggressive,
    /// Generous quotas or local models
    Lenient,
}

impl From<PresetArg> for PipelineConfig {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Default => PipelineConfig::default(),
            PresetArg::Aggressive => PipelineConfig::aggressive(),
            PresetArg::Lenient => PipelineConfig::lenient(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "lorekeeper", "extract", "handbook.txt", "--mode", "manual", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.format, CliFormat::Json);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.file, PathBuf::from("handbook.txt"));
                assert_eq!(ExtractionMode::from(args.mode), ExtractionMode::Manual);
                assert!(args.label.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_mode_defaults_to_auto() {
        let cli = Cli::try_parse_from(["lorekeeper", "extract", "a.txt"]).unwrap();
        match cli.command {
            Command::Extract(args) => assert_eq!(args.mode, ModeArg::Auto),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_preset_conversion() {
        assert_eq!(PipelineConfig::from(PresetArg::Lenient), PipelineConfig::lenient());
    }
}
