//! Error types for header parsing and configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a BrainVision `.vhdr` file.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("IO error reading header {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a BrainVision header (first line: {first_line:?})")]
    MissingMagic { first_line: String },

    #[error("header has no DataFile entry in [Common Infos]")]
    MissingDataFile,
}

/// Errors raised while loading or validating a [`crate::FixupConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid naming scheme: {message}")]
    InvalidScheme { message: String },
}
