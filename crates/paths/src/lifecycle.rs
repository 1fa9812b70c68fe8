use crate::{Error, Filesystem, LocalFilesystem, OvnPaths};

use std::fmt::{self, Display};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

const DIR_MODE: u32 = 0o700;
const BACKUP_DIR_MODE: u32 = 0o750;

/// What happened to a single directory during teardown.
#[derive(Debug)]
pub enum DirectoryStatus {
    /// Moved into the backup at the given path.
    Moved(PathBuf),

    /// Did not exist, so there was nothing to back up.
    Missing,

    /// Removed.
    Removed,

    /// The operation failed.
    Failed(io::Error),
}

/// The outcome of backing up or removing one directory.
#[derive(Debug)]
pub struct DirectoryOutcome {
    /// The directory.
    pub path: PathBuf,

    /// What happened to it.
    pub status: DirectoryStatus,
}

impl DirectoryOutcome {
    /// Returns true if the operation on this directory failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        matches!(self.status, DirectoryStatus::Failed(_))
    }
}

/// Per-directory outcomes of a teardown.
#[derive(Debug)]
pub struct TeardownReport {
    /// Where backups were moved to.
    pub backup_root: PathBuf,

    /// One entry per backup-eligible directory.
    pub backups: Vec<DirectoryOutcome>,

    /// One entry per required directory. Empty if backups failed.
    pub removals: Vec<DirectoryOutcome>,
}

impl TeardownReport {
    /// Every failed backup or removal.
    pub fn failures(&self) -> impl Iterator<Item = &DirectoryOutcome> {
        self.backups
            .iter()
            .chain(self.removals.iter())
            .filter(|outcome| outcome.failed())
    }
}

impl Display for TeardownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for outcome in self.failures() {
            if let DirectoryStatus::Failed(e) = &outcome.status {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {e}", outcome.path.display())?;
                first = false;
            }
        }

        Ok(())
    }
}

/// Creates the runtime directories of a node and tears them down again.
///
/// Teardown never removes anything unless every backup-eligible directory
/// was first moved into a fresh `backup_<epoch>` directory.
#[derive(Clone, Debug)]
pub struct PathLifecycle<F = LocalFilesystem>
where
    F: Filesystem,
{
    fs: F,
    paths: OvnPaths,
}

impl PathLifecycle<LocalFilesystem> {
    /// Creates a lifecycle over the local filesystem.
    #[must_use]
    pub const fn new(paths: OvnPaths) -> Self {
        Self {
            fs: LocalFilesystem,
            paths,
        }
    }
}

impl<F> PathLifecycle<F>
where
    F: Filesystem,
{
    /// Creates a lifecycle over `fs`.
    pub const fn with_filesystem(paths: OvnPaths, fs: F) -> Self {
        Self { fs, paths }
    }

    /// The layout this lifecycle manages.
    pub const fn paths(&self) -> &OvnPaths {
        &self.paths
    }

    /// Creates every required directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::CreateDir` for the first directory that cannot be
    /// created.
    pub async fn bootstrap(&self) -> Result<(), Error> {
        for path in self.paths.required_dirs() {
            self.fs
                .create_dir_all(&path, DIR_MODE)
                .await
                .map_err(|source| Error::CreateDir {
                    path: path.clone(),
                    source,
                })?;
            debug!("ensured {}", path.display());
        }

        Ok(())
    }

    /// Backs up the data directories, then removes every runtime directory.
    ///
    /// # Errors
    ///
    /// See [`PathLifecycle::teardown_at`].
    pub async fn teardown(&self) -> Result<TeardownReport, Error> {
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        self.teardown_at(epoch_secs).await
    }

    /// Backs up the data directories into `backup_<epoch_secs>`, then removes
    /// every runtime directory.
    ///
    /// # Errors
    ///
    /// - `Error::BackupRoot` if the backup directory cannot be created
    ///   (including when it already exists). Nothing is moved or removed.
    /// - `Error::BackupIncomplete` if any directory could not be moved.
    ///   Nothing is removed.
    /// - `Error::RemovalIncomplete` if backups succeeded but some directories
    ///   could not be removed.
    pub async fn teardown_at(&self, epoch_secs: u64) -> Result<TeardownReport, Error> {
        // Backup root. Never reuse an existing one.
        let backup_root = self.paths.backup_dir(epoch_secs);
        self.fs
            .create_dir(&backup_root, BACKUP_DIR_MODE)
            .await
            .map_err(|source| Error::BackupRoot {
                path: backup_root.clone(),
                source,
            })?;

        // Move, collecting failures.
        let mut backups = Vec::new();
        for dir in self.paths.backup_dirs() {
            let status = self.back_up(&dir, &backup_root).await;
            if let DirectoryStatus::Failed(e) = &status {
                warn!("failed to back up {}: {}", dir.display(), e);
            }
            backups.push(DirectoryOutcome { path: dir, status });
        }

        let mut report = TeardownReport {
            backup_root,
            backups,
            removals: Vec::new(),
        };

        if report.backups.iter().any(DirectoryOutcome::failed) {
            return Err(Error::BackupIncomplete(report));
        }
        info!("data backed up to {}", report.backup_root.display());

        // Remove, collecting failures.
        for dir in self.paths.required_dirs() {
            let status = match self.fs.remove_dir_all(&dir).await {
                Ok(()) => DirectoryStatus::Removed,
                Err(e) => {
                    warn!("failed to remove {}: {}", dir.display(), e);
                    DirectoryStatus::Failed(e)
                }
            };
            report.removals.push(DirectoryOutcome { path: dir, status });
        }

        if report.removals.iter().any(DirectoryOutcome::failed) {
            return Err(Error::RemovalIncomplete(report));
        }

        Ok(report)
    }

    async fn back_up(&self, dir: &Path, backup_root: &Path) -> DirectoryStatus {
        match self.fs.exists(dir).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("{} does not exist, nothing to back up", dir.display());
                return DirectoryStatus::Missing;
            }
            Err(e) => return DirectoryStatus::Failed(e),
        }

        let Some(name) = dir.file_name() else {
            return DirectoryStatus::Failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "backup directory has no final component",
            ));
        };

        let destination = backup_root.join(name);
        match self.fs.rename(dir, &destination).await {
            Ok(()) => DirectoryStatus::Moved(destination),
            Err(e) => DirectoryStatus::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::tempdir;

    const EPOCH: u64 = 1_700_000_000;

    /// Local filesystem that can fail renames of one path and counts removals.
    #[derive(Clone, Default)]
    struct RecordingFs {
        fail_rename: Option<PathBuf>,
        removals: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Filesystem for RecordingFs {
        async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
            LocalFilesystem.create_dir_all(path, mode).await
        }

        async fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
            LocalFilesystem.create_dir(path, mode).await
        }

        async fn exists(&self, path: &Path) -> io::Result<bool> {
            LocalFilesystem.exists(path).await
        }

        async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if self.fail_rename.as_deref() == Some(from) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            LocalFilesystem.rename(from, to).await
        }

        async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            self.removals.fetch_add(1, Ordering::SeqCst);
            LocalFilesystem.remove_dir_all(path).await
        }
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let dir = tempdir().unwrap();
        let lifecycle = PathLifecycle::new(OvnPaths::new(dir.path()));

        lifecycle.bootstrap().await.unwrap();
        lifecycle.bootstrap().await.unwrap();

        for path in lifecycle.paths().required_dirs() {
            assert!(path.is_dir(), "{} missing", path.display());
        }
    }

    #[tokio::test]
    async fn test_bootstrap_reports_failing_path() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::write(&root, b"not a directory").unwrap();

        let lifecycle = PathLifecycle::new(OvnPaths::new(&root));

        match lifecycle.bootstrap().await {
            Err(Error::CreateDir { path, .. }) => {
                assert_eq!(path, lifecycle.paths().central_data_dir());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_teardown_backs_up_then_removes() {
        let dir = tempdir().unwrap();
        let lifecycle = PathLifecycle::new(OvnPaths::new(dir.path()));
        lifecycle.bootstrap().await.unwrap();

        let db = lifecycle.paths().central_data_dir().join("ovnnb_db.db");
        std::fs::write(&db, b"raft log").unwrap();

        let report = lifecycle.teardown_at(EPOCH).await.unwrap();

        assert_eq!(report.backup_root, dir.path().join("backup_1700000000"));
        assert!(
            report
                .backups
                .iter()
                .all(|o| matches!(o.status, DirectoryStatus::Moved(_)))
        );
        assert_eq!(
            std::fs::read(report.backup_root.join("central").join("ovnnb_db.db")).unwrap(),
            b"raft log"
        );

        assert_eq!(
            report.removals.len(),
            lifecycle.paths().required_dirs().len()
        );
        for path in lifecycle.paths().required_dirs() {
            assert!(!path.exists(), "{} still exists", path.display());
        }
    }

    #[tokio::test]
    async fn test_failed_backup_removes_nothing() {
        let dir = tempdir().unwrap();
        let paths = OvnPaths::new(dir.path());
        let fs = RecordingFs {
            fail_rename: Some(paths.switch_data_dir()),
            ..RecordingFs::default()
        };
        let lifecycle = PathLifecycle::with_filesystem(paths, fs.clone());
        lifecycle.bootstrap().await.unwrap();

        let err = lifecycle.teardown_at(EPOCH).await.unwrap_err();

        let Error::BackupIncomplete(report) = &err else {
            panic!("unexpected error: {err:?}");
        };
        let failed: Vec<_> = report.failures().map(|o| o.path.clone()).collect();
        assert_eq!(failed, vec![lifecycle.paths().switch_data_dir()]);
        assert!(report.removals.is_empty());
        assert_eq!(fs.removals.load(Ordering::SeqCst), 0);

        // Moves that did succeed stay in the backup; the rest is untouched.
        assert!(report.backup_root.join("central").is_dir());
        assert!(lifecycle.paths().switch_data_dir().is_dir());
        assert!(lifecycle.paths().logs_dir().is_dir());
        assert!(err.to_string().contains("refusing to continue"));
    }

    #[tokio::test]
    async fn test_existing_backup_root_aborts_teardown() {
        let dir = tempdir().unwrap();
        let fs = RecordingFs::default();
        let lifecycle = PathLifecycle::with_filesystem(OvnPaths::new(dir.path()), fs.clone());
        lifecycle.bootstrap().await.unwrap();

        std::fs::create_dir(lifecycle.paths().backup_dir(EPOCH)).unwrap();

        assert!(matches!(
            lifecycle.teardown_at(EPOCH).await,
            Err(Error::BackupRoot { .. })
        ));
        assert_eq!(fs.removals.load(Ordering::SeqCst), 0);
        assert!(lifecycle.paths().central_data_dir().is_dir());
    }

    #[tokio::test]
    async fn test_teardown_of_empty_root_succeeds() {
        let dir = tempdir().unwrap();
        let lifecycle = PathLifecycle::new(OvnPaths::new(dir.path()));

        let report = lifecycle.teardown_at(EPOCH).await.unwrap();

        assert!(
            report
                .backups
                .iter()
                .all(|o| matches!(o.status, DirectoryStatus::Missing))
        );
        assert!(
            report
                .removals
                .iter()
                .all(|o| matches!(o.status, DirectoryStatus::Removed))
        );
    }
}
