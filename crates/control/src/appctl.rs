use crate::{AdminControl, Error, Result};

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

const APPCTL_BINARY: &str = "ovn-appctl";

/// Options for configuring `AppCtl`.
#[derive(Clone, Debug)]
pub struct AppCtlOptions {
    /// Directory holding `ovn-appctl`. Looked up on `PATH` when `None`.
    pub bin_dir: Option<PathBuf>,

    /// Budget for a single command.
    pub timeout: Duration,
}

impl Default for AppCtlOptions {
    fn default() -> Self {
        Self {
            bin_dir: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Runs commands through `ovn-appctl`.
#[derive(Clone, Debug)]
pub struct AppCtl {
    executable: PathBuf,
    timeout: Duration,
}

impl AppCtl {
    /// Creates a new `AppCtl`.
    ///
    /// # Errors
    ///
    /// Returns `Error::BinaryNotFound` if no `bin_dir` is given and
    /// `ovn-appctl` is not on the `PATH`.
    pub fn new(AppCtlOptions { bin_dir, timeout }: AppCtlOptions) -> Result<Self> {
        let executable = match bin_dir {
            Some(dir) => dir.join(APPCTL_BINARY),
            None => {
                which::which(APPCTL_BINARY).map_err(|_| Error::BinaryNotFound(APPCTL_BINARY))?
            }
        };

        Ok(Self {
            executable,
            timeout,
        })
    }

    fn args(&self, socket: &Path, command: &str, args: &[&str]) -> Vec<String> {
        let mut all = vec![
            format!("--timeout={}", self.timeout.as_secs().max(1)),
            "-t".to_string(),
            socket.to_string_lossy().to_string(),
            command.to_string(),
        ];
        all.extend(args.iter().map(ToString::to_string));
        all
    }
}

#[async_trait]
impl AdminControl for AppCtl {
    async fn call(&self, socket: &Path, command: &str, args: &[&str]) -> Result<String> {
        if !tokio::fs::try_exists(socket)
            .await
            .map_err(|e| Error::Io("failed to check control socket", e))?
        {
            return Err(Error::SocketMissing(socket.to_path_buf()));
        }

        let description = [APPCTL_BINARY, command]
            .into_iter()
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        debug!("running {} against {}", description, socket.display());

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.executable)
                .args(self.args(socket, command, args))
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| Error::Timeout(description.clone(), self.timeout))?
        .map_err(|e| Error::Io("failed to run ovn-appctl", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            // The daemon went away between the existence check and the call.
            if daemon_gone(&stderr) {
                return Err(Error::SocketMissing(socket.to_path_buf()));
            }

            return Err(Error::NonZeroExit {
                command: description,
                status: output.status,
                stderr,
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        trace!("{} returned: {}", description, stdout.trim());

        Ok(stdout)
    }
}

fn daemon_gone(stderr: &str) -> bool {
    stderr.contains("No such file or directory")
}
