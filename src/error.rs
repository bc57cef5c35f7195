//! Error types for the docpress pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for docpress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the pipeline.
///
/// Layout itself never fails: overflowing words and long bodies degrade to
/// overflowing lines and extra pages. Errors only come from validating the
/// caller's input or from I/O around the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading inputs or writing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Layout or configuration JSON could not be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The body produced no renderable blocks.
    #[error("Document has no renderable content")]
    EmptyDocument,

    /// A TTF/OTF face could not be parsed.
    #[error("Failed to parse font: {0}")]
    FontParse(String),

    /// Page geometry or other configuration values are unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An invoice failed validation.
    #[error("Invalid invoice: {0}")]
    InvalidInvoice(String),
}
