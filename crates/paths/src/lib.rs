//! Runtime directory layout of an OVN node, and the crash-safe lifecycle
//! that creates it at bring-up and backs it up before removing it at
//! departure.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod error;
mod filesystem;
mod lifecycle;

pub use error::Error;
pub use filesystem::{Filesystem, LocalFilesystem};
pub use lifecycle::{DirectoryOutcome, DirectoryStatus, PathLifecycle, TeardownReport};

use std::path::{Path, PathBuf};

/// Every path the node reads or writes, derived from a single root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OvnPaths {
    root: PathBuf,
}

impl OvnPaths {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root every other path lives under. Backups are created here.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persistent data.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Northbound and Southbound database files.
    #[must_use]
    pub fn central_data_dir(&self) -> PathBuf {
        self.data_dir().join("central")
    }

    /// Open vSwitch database files.
    #[must_use]
    pub fn switch_data_dir(&self) -> PathBuf {
        self.data_dir().join("switch")
    }

    /// Certificates and keys.
    #[must_use]
    pub fn pki_dir(&self) -> PathBuf {
        self.data_dir().join("pki")
    }

    /// Daemon logs.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Volatile runtime state: pid files and sockets.
    #[must_use]
    pub fn run_dir(&self) -> PathBuf {
        self.root.join("run")
    }

    /// Runtime directory of the central services.
    #[must_use]
    pub fn central_run_dir(&self) -> PathBuf {
        self.run_dir().join("central")
    }

    /// Runtime directory of `ovn-controller`.
    #[must_use]
    pub fn chassis_run_dir(&self) -> PathBuf {
        self.run_dir().join("chassis")
    }

    /// Runtime directory of Open vSwitch.
    #[must_use]
    pub fn switch_run_dir(&self) -> PathBuf {
        self.run_dir().join("switch")
    }

    /// The generated environment file.
    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        self.data_dir().join("ovn.env")
    }

    /// Control socket of the Northbound database server.
    #[must_use]
    pub fn nb_control_socket(&self) -> PathBuf {
        self.central_run_dir().join("ovnnb_db.ctl")
    }

    /// Control socket of the Southbound database server.
    #[must_use]
    pub fn sb_control_socket(&self) -> PathBuf {
        self.central_run_dir().join("ovnsb_db.ctl")
    }

    /// Control socket of `ovn-controller`.
    #[must_use]
    pub fn controller_control_socket(&self) -> PathBuf {
        self.chassis_run_dir().join("ovn-controller.ctl")
    }

    /// CA certificate of the cluster.
    #[must_use]
    pub fn ca_cert_file(&self) -> PathBuf {
        self.pki_dir().join("cluster-ca.crt")
    }

    /// CA private key of the cluster.
    #[must_use]
    pub fn ca_key_file(&self) -> PathBuf {
        self.pki_dir().join("cluster-ca.key")
    }

    /// Directories created at bring-up and removed at departure.
    #[must_use]
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.central_data_dir(),
            self.switch_data_dir(),
            self.pki_dir(),
            self.logs_dir(),
            self.central_run_dir(),
            self.chassis_run_dir(),
            self.switch_run_dir(),
        ]
    }

    /// Directories moved into the backup before anything is removed. Their
    /// final components are unique, so they cannot collide inside a backup.
    #[must_use]
    pub fn backup_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.central_data_dir(),
            self.switch_data_dir(),
            self.pki_dir(),
        ]
    }

    /// The backup directory for a departure at `epoch_secs`.
    #[must_use]
    pub fn backup_dir(&self, epoch_secs: u64) -> PathBuf {
        self.root.join(format!("backup_{epoch_secs}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_backup_dirs_are_required_and_uniquely_named() {
        let paths = OvnPaths::new("/var/lib/ovn-node");
        let required = paths.required_dirs();

        let mut names = HashSet::new();
        for dir in paths.backup_dirs() {
            assert!(required.contains(&dir));
            assert!(names.insert(dir.file_name().unwrap().to_owned()));
        }
    }

    #[test]
    fn test_sockets_live_in_run_dirs() {
        let paths = OvnPaths::new("/var/lib/ovn-node");

        assert_eq!(
            paths.nb_control_socket(),
            PathBuf::from("/var/lib/ovn-node/run/central/ovnnb_db.ctl")
        );
        assert_eq!(
            paths.controller_control_socket(),
            PathBuf::from("/var/lib/ovn-node/run/chassis/ovn-controller.ctl")
        );
        assert_eq!(
            paths.backup_dir(1_700_000_000),
            PathBuf::from("/var/lib/ovn-node/backup_1700000000")
        );
    }
}
