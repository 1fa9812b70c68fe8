//! Administrative control of the local OVN daemons and node services.
//!
//! Two seams are exposed:
//! - [`AdminControl`] sends `ovn-appctl` style commands to a daemon through
//!   its unix control socket.
//! - [`ServiceControl`] starts and stops the node's services.
//!
//! Both are opaque to their callers: a command either succeeds or fails with
//! an [`Error`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod appctl;
mod error;
mod services;

pub use appctl::{AppCtl, AppCtlOptions};
pub use error::{Error, Result};
pub use services::{SystemdServices, SystemdServicesOptions};

use std::path::Path;

use async_trait::async_trait;
use ovn_membership::ServiceKind;

/// Sends administrative commands to a daemon's control socket.
#[async_trait]
pub trait AdminControl
where
    Self: Send + Sync + Clone + 'static,
{
    /// Runs `command args..` against the daemon listening on `socket` and
    /// returns what it printed.
    async fn call(&self, socket: &Path, command: &str, args: &[&str]) -> Result<String>;
}

/// Starts and stops node services.
#[async_trait]
pub trait ServiceControl
where
    Self: Send + Sync + Clone + 'static,
{
    /// Stops `service`. With `force`, a service that is not running counts as
    /// stopped.
    async fn stop(&self, service: ServiceKind, force: bool) -> Result<()>;
}
