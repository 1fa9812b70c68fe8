use crate::{DatabaseKind, DatabaseState};

use std::time::Duration;

use thiserror::Error;

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while inspecting OVN databases.
#[derive(Debug, Error)]
pub enum Error {
    /// The control socket could not be queried.
    #[error(transparent)]
    Control(#[from] ovn_control::Error),

    /// The database did not reach the target state in time.
    #[error("{database} did not reach {target} within {timeout:?}")]
    Timeout {
        /// The database waited on.
        database: DatabaseKind,

        /// The state waited for.
        target: DatabaseState,

        /// How long was waited.
        timeout: Duration,
    },
}
