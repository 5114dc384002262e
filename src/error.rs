//! Fatal engine errors.
//!
//! Anything listed here stops a run before (or instead of) producing output.
//! Per-value problems never surface as an [`ObfuscationError`]; they are logged and
//! the affected value falls back to its original form.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObfuscationError {
    #[error("No obfuscation profile found at {path:?}")]
    ProfileNotFound { path: PathBuf },

    #[error("Obfuscation profile {path:?} is malformed: {reason}")]
    ProfileFormat { path: PathBuf, reason: String },

    #[error(
        "The columns in the obfuscation profile do not match the columns in the table. Mismatched column_name(s) = {columns:?}"
    )]
    SchemaMismatch { columns: Vec<String> },

    #[error("Unexpected data type '{dtype}' for column '{column}' in fields to obfuscate")]
    UnsupportedType { column: String, dtype: String },

    #[error("Column '{column}' not found in table")]
    MissingColumn { column: String },

    #[error("Header mismatch while concatenating tables: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Expected one randomness bundle per record ({expected}), got {found}")]
    BundleCount { expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ObfuscationError>;
