//! Error types for the fixup operations

use bids_types::{ConfigError, HeaderError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixup-specific error types
#[derive(Error, Debug)]
pub enum FixupError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    #[error("Refusing to write '{name}': not a plain file name")]
    InvalidTarget { name: String },
}

impl FixupError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        FixupError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for fixup operations
pub type FixupResult<T> = Result<T, FixupError>;
