use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving local daemons and services.
#[derive(Debug, Error)]
pub enum Error {
    /// Command output was not valid UTF-8.
    #[error(transparent)]
    BadUtf8(#[from] std::string::FromUtf8Error),

    /// The control binary could not be located.
    #[error("{0} binary not found")]
    BinaryNotFound(&'static str),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// A blocking control task panicked or was cancelled.
    #[error("control task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The command ran but reported failure.
    #[error("{command} exited with {status}: {stderr}")]
    NonZeroExit {
        /// The command that was run.
        command: String,

        /// The exit status.
        status: ExitStatus,

        /// Whatever the command wrote to stderr.
        stderr: String,
    },

    /// Nothing is listening on the control socket.
    #[error("control socket {0:?} does not exist")]
    SocketMissing(PathBuf),

    /// The command did not finish within its budget.
    #[error("{0} timed out after {1:?}")]
    Timeout(String, Duration),
}
