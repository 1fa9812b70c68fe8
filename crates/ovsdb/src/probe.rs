use crate::{DatabaseSpec, DatabaseState, Result};

use async_trait::async_trait;
use ovn_control::{AdminControl, Error as ControlError};
use tracing::trace;

/// Reads the cluster state of a database.
#[async_trait]
pub trait StatusProbe
where
    Self: Send + Sync + Clone + 'static,
{
    /// Returns the state the server behind `spec` reports.
    async fn state(&self, spec: &DatabaseSpec) -> Result<DatabaseState>;
}

/// Asks the database server through `cluster/status` on its control socket.
#[derive(Clone, Debug)]
pub struct ClusterStatusProbe<A>
where
    A: AdminControl,
{
    control: A,
}

impl<A> ClusterStatusProbe<A>
where
    A: AdminControl,
{
    /// Creates a new `ClusterStatusProbe`.
    pub const fn new(control: A) -> Self {
        Self { control }
    }
}

#[async_trait]
impl<A> StatusProbe for ClusterStatusProbe<A>
where
    A: AdminControl,
{
    async fn state(&self, spec: &DatabaseSpec) -> Result<DatabaseState> {
        let result = self
            .control
            .call(
                &spec.control_socket,
                "cluster/status",
                &[spec.kind.db_name()],
            )
            .await;

        let state = match result {
            Ok(output) if output.contains("unknown database") => DatabaseState::Removed,
            Ok(output) => DatabaseState::from_cluster_status(&output),
            Err(e) if absent(&e) => DatabaseState::Removed,
            Err(e) => return Err(e.into()),
        };

        trace!("{} is {}", spec.kind, state);

        Ok(state)
    }
}

fn absent(error: &ControlError) -> bool {
    match error {
        ControlError::SocketMissing(_) => true,
        ControlError::NonZeroExit { stderr, .. } => stderr.contains("unknown database"),
        _ => false,
    }
}
