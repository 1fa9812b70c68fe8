use std::path::PathBuf;

use thiserror::Error;

use crate::TeardownReport;

/// Errors that can occur while creating or tearing down runtime paths.
#[derive(Debug, Error)]
pub enum Error {
    /// A required directory could not be created.
    #[error("unable to create {path:?}: {source}")]
    CreateDir {
        /// The directory that failed.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backup directory could not be created. Nothing was moved or removed.
    #[error(
        "failed to create backup directory {path:?}, refusing to continue with data removal: {source}"
    )]
    BackupRoot {
        /// The backup directory.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// At least one directory could not be backed up. Nothing was removed.
    #[error("failures occurred during backup, refusing to continue with data removal: {0}")]
    BackupIncomplete(TeardownReport),

    /// Backups succeeded but some directories could not be removed.
    #[error("failed to remove runtime directories: {0}")]
    RemovalIncomplete(TeardownReport),
}

impl Error {
    /// The per-directory outcomes, if the teardown got past creating the
    /// backup directory.
    #[must_use]
    pub const fn report(&self) -> Option<&TeardownReport> {
        match self {
            Self::BackupIncomplete(report) | Self::RemovalIncomplete(report) => Some(report),
            Self::CreateDir { .. } | Self::BackupRoot { .. } => None,
        }
    }
}
