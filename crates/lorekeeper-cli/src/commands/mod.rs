//! Command implementations.

pub mod config;
pub mod extract;
pub mod validate;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::validate::execute_validate;

use crate::error::Result;
use lorekeeper_extractor::{decode_document, ExtractorError};
use std::fs;
use std::path::Path;

/// Read a document as text; binary files are decoded lossily so the
/// content validator can reject them with a reason.
fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let text = decode_document(&bytes).map_err(ExtractorError::from)?;
    Ok(text)
}
