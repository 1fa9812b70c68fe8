use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{self, DirBuilder};

/// The filesystem operations the path lifecycle performs.
#[async_trait]
pub trait Filesystem
where
    Self: Send + Sync + Clone + 'static,
{
    /// Creates `path` and any missing parents. Existing directories are fine.
    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Creates `path`, failing if it already exists.
    async fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Returns true if `path` exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Moves `from` to `to`.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Recursively removes `path`. A missing path is not an error.
    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFilesystem;

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        DirBuilder::new()
            .recursive(true)
            .mode(mode)
            .create(path)
            .await
    }

    async fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        DirBuilder::new().mode(mode).create(path).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        fs::try_exists(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir_all(path).await {
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}
