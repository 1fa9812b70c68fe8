//! Inspection of the clustered OVN databases: which local server holds a
//! database, what state it reports for its cluster membership, and waiting
//! for that state to change.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod error;
mod poll;
mod probe;
mod waiter;

pub use error::{Error, Result};
pub use poll::{PollError, poll_until};
pub use probe::{ClusterStatusProbe, StatusProbe};
pub use waiter::{DEFAULT_DB_WAIT, MembershipWaiter};

use std::fmt::{self, Display};
use std::path::PathBuf;

use ovn_paths::OvnPaths;

/// The databases a central node serves.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DatabaseKind {
    /// The Northbound database.
    Northbound,

    /// The Southbound database.
    Southbound,
}

impl DatabaseKind {
    /// The schema name of the database.
    #[must_use]
    pub const fn db_name(&self) -> &'static str {
        match self {
            Self::Northbound => "OVN_Northbound",
            Self::Southbound => "OVN_Southbound",
        }
    }
}

impl Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.db_name())
    }
}

/// Cluster membership state reported by a database server.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DatabaseState {
    /// The status could not be interpreted.
    Unknown,

    /// The server is joining the cluster.
    Joining,

    /// The server is a member of the cluster.
    Connected,

    /// The server is leaving the cluster.
    Leaving,

    /// The server is a member but cannot reach the cluster.
    Disconnected,

    /// The server has left the cluster, or no longer serves the database.
    Removed,
}

impl DatabaseState {
    /// Parses the `Status:` line of `cluster/status` output.
    #[must_use]
    pub fn from_cluster_status(output: &str) -> Self {
        let Some(status) = output
            .lines()
            .find_map(|line| line.trim().strip_prefix("Status:"))
            .map(str::trim)
        else {
            return Self::Unknown;
        };

        match status {
            "cluster member" => Self::Connected,
            "joining cluster" => Self::Joining,
            "leaving cluster" => Self::Leaving,
            "left cluster" => Self::Removed,
            s if s.starts_with("disconnected from the cluster") => Self::Disconnected,
            _ => Self::Unknown,
        }
    }
}

impl Display for DatabaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Joining => "joining",
            Self::Connected => "connected",
            Self::Leaving => "leaving",
            Self::Disconnected => "disconnected",
            Self::Removed => "removed",
        })
    }
}

/// The local server holding one database.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatabaseSpec {
    /// Which database.
    pub kind: DatabaseKind,

    /// Control socket of the local server holding it.
    pub control_socket: PathBuf,
}

impl DatabaseSpec {
    /// Builds the spec for `kind` on the local server.
    #[must_use]
    pub fn new(kind: DatabaseKind, paths: &OvnPaths) -> Self {
        let control_socket = match kind {
            DatabaseKind::Northbound => paths.nb_control_socket(),
            DatabaseKind::Southbound => paths.sb_control_socket(),
        };

        Self {
            kind,
            control_socket,
        }
    }
}
