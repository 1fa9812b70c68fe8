use std::path::PathBuf;

use thiserror::Error;

/// Result type for environment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading the environment file.
#[derive(Debug, Error)]
pub enum Error {
    /// The environment file path has no parent directory.
    #[error("environment file {0:?} has no parent directory")]
    InvalidPath(PathBuf),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// A line of the environment file is not `KEY="value"`.
    #[error("malformed environment line: {0:?}")]
    MalformedLine(String),

    /// Membership could not be resolved.
    #[error(transparent)]
    Membership(#[from] ovn_membership::Error),

    /// A required key is absent from the environment file.
    #[error("environment file is missing {0}")]
    MissingKey(&'static str),
}
