//! Pipeline configuration loading for the CLI.

use crate::error::{CliError, Result};
use lorekeeper_extractor::PipelineConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file location (`~/.lorekeeper/config.toml`).
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lorekeeper").join("config.toml"))
}

/// Load the pipeline configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// when present, otherwise the built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<PipelineConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_path().filter(|p| p.exists()),
    };

    let config = match path {
        Some(path) => {
            debug!("Loading pipeline configuration from {}", path.display());
            let contents = fs::read_to_string(&path).map_err(|e| {
                CliError::Config(format!("cannot read {}: {}", path.display(), e))
            })?;
            PipelineConfig::from_toml(&contents).map_err(CliError::Config)?
        }
        None => PipelineConfig::default(),
    };

    config.validate().map_err(CliError::Config)?;
    Ok(config)
}
