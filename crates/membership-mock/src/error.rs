//! Error types for the mock membership implementation.

use ovn_membership::{MembershipError, MembershipErrorKind};
use thiserror::Error;

/// Error type for the mock membership implementation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error when a member is not found.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Error when loading or parsing the snapshot file.
    #[error("Snapshot file error: {0}")]
    SnapshotFile(String),
}

impl MembershipError for Error {
    fn kind(&self) -> MembershipErrorKind {
        match self {
            Self::NodeNotFound(_) => MembershipErrorKind::NodeNotFound,
            Self::SnapshotFile(_) => MembershipErrorKind::Other,
        }
    }
}
