//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or reading inputs.
///
/// A missing doc-comment is not an error; it is a [`crate::detect::Finding`].
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("File or directory `{}` does not exist.", .0.display())]
    MissingInput(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid exclude pattern: {0}")]
    InvalidGlob(#[from] globset::Error),
}

pub type Result<T, E = CheckError> = std::result::Result<T, E>;
