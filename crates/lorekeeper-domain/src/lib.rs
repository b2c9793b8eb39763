//! Lorekeeper Domain Layer
//!
//! Core value types for the document-to-knowledge pipeline. This crate has
//! no dependencies beyond `uuid` and defines the vocabulary every other crate
//! speaks.
//!
//! ## Key Concepts
//!
//! - **KnowledgeRecord**: The unit of output, created once and never edited
//! - **Category**: Fixed classification (department, position, terminology, procedure, regulation)
//! - **Importance**: Ranking used when the record set has to be trimmed
//! - **CompletionProvider**: The opaque generative text endpoint
//!
//! ## Architecture
//!
//! - Pure types only, no I/O
//! - Infrastructure implementations (HTTP providers, mocks) live in `lorekeeper-llm`
//! - Pipeline logic lives in `lorekeeper-extractor`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use category::{Category, Importance};
pub use record::{KnowledgeRecord, RecordId};
pub use traits::{CompletionProvider, CompletionRequest};
