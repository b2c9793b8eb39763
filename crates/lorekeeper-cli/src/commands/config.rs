//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use lorekeeper_extractor::PipelineConfig;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs) -> Result<()> {
    println!("{}", render(args)?);
    Ok(())
}

fn render(args: ConfigArgs) -> Result<String> {
    PipelineConfig::from(args.preset)
        .to_toml()
        .map_err(CliError::Config)
}
