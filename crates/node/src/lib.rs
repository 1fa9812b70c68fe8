//! A single member of the OVN cluster: brings its runtime state up, keeps
//! its environment in step with membership and takes it out of the cluster
//! again.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod error;

pub use error::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

use ovn_control::{AdminControl, ServiceControl};
use ovn_departure::{DepartureOrchestrator, DepartureOrchestratorOptions, DepartureReport};
use ovn_environment::{
    EnvironmentDocument, EnvironmentProjector, EnvironmentProjectorOptions, PkiCaSource,
};
use ovn_membership::{AddressDirectory, MembershipStore, ServiceKind};
use ovn_ovsdb::{
    ClusterStatusProbe, DatabaseKind, DatabaseSpec, DatabaseState, MembershipWaiter, StatusProbe,
};
use ovn_paths::{OvnPaths, PathLifecycle};
use tracing::info;

/// Options for creating a new `OvnNode`.
pub struct OvnNodeOptions<M, D, A, S>
where
    M: MembershipStore,
    D: AddressDirectory,
    A: AdminControl,
    S: ServiceControl,
{
    /// Sends commands to the local daemons.
    pub admin: A,

    /// How long a departure waits for each database to report it has left.
    pub db_wait: Duration,

    /// Where members can be reached.
    pub directory: D,

    /// The address other members reach this node on.
    pub local_address: IpAddr,

    /// The name this node is registered under.
    pub name: String,

    /// The runtime directory layout.
    pub paths: OvnPaths,

    /// Stops the node services.
    pub services: S,

    /// Which member runs which service.
    pub store: M,
}

/// One node of the cluster.
pub struct OvnNode<M, D, A, S>
where
    M: MembershipStore,
    D: AddressDirectory,
    A: AdminControl,
    S: ServiceControl,
{
    lifecycle: PathLifecycle,
    name: String,
    orchestrator: DepartureOrchestrator<A, S, ClusterStatusProbe<A>>,
    probe: ClusterStatusProbe<A>,
    projector: EnvironmentProjector<M, D, PkiCaSource>,
}

impl<M, D, A, S> OvnNode<M, D, A, S>
where
    M: MembershipStore,
    D: AddressDirectory,
    A: AdminControl,
    S: ServiceControl,
{
    /// Creates a new `OvnNode`.
    pub fn new(
        OvnNodeOptions {
            admin,
            db_wait,
            directory,
            local_address,
            name,
            paths,
            services,
            store,
        }: OvnNodeOptions<M, D, A, S>,
    ) -> Self {
        let probe = ClusterStatusProbe::new(admin.clone());

        let projector = EnvironmentProjector::new(EnvironmentProjectorOptions {
            ca_source: PkiCaSource::new(&paths),
            directory,
            env_file: paths.env_file(),
            local_address,
            store,
        });

        let orchestrator = DepartureOrchestrator::new(DepartureOrchestratorOptions {
            admin,
            db_wait,
            lifecycle: PathLifecycle::new(paths.clone()),
            services,
            waiter: MembershipWaiter::new(probe.clone()),
        });

        Self {
            lifecycle: PathLifecycle::new(paths),
            name,
            orchestrator,
            probe,
            projector,
        }
    }

    /// The name this node is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The runtime directory layout.
    pub const fn paths(&self) -> &OvnPaths {
        self.lifecycle.paths()
    }

    /// Creates the runtime directories and writes the first environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or the environment
    /// cannot be generated.
    pub async fn bootstrap(&self) -> Result<EnvironmentDocument> {
        info!("bootstrapping {}", self.name);

        self.lifecycle.bootstrap().await?;

        self.generate_environment().await
    }

    /// Regenerates the environment file from current membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be generated.
    pub async fn generate_environment(&self) -> Result<EnvironmentDocument> {
        Ok(self.projector.generate().await?)
    }

    /// Regenerates the environment after `member` joined.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be generated.
    pub async fn on_member_joined(&self, member: &str) -> Result<EnvironmentDocument> {
        info!("{} joined, regenerating environment", member);

        self.generate_environment().await
    }

    /// Regenerates the environment after `member` was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be generated.
    pub async fn on_member_removed(&self, member: &str) -> Result<EnvironmentDocument> {
        info!("{} was removed, regenerating environment", member);

        self.generate_environment().await
    }

    /// Takes this node out of the cluster before it is removed.
    pub async fn pre_remove(&self) -> DepartureReport {
        self.orchestrator.leave(&self.name).await
    }

    /// Returns true if this node is registered for `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if membership cannot be read.
    pub async fn local_service_active(&self, service: ServiceKind) -> Result<bool> {
        Ok(self
            .projector
            .builder()
            .resolver()
            .local_service_active(&self.name, service)
            .await?)
    }

    /// Asks the local server holding `kind` for its cluster state.
    ///
    /// # Errors
    ///
    /// Returns an error if the local server cannot be queried.
    pub async fn database_state(&self, kind: DatabaseKind) -> Result<DatabaseState> {
        let spec = DatabaseSpec::new(kind, self.paths());

        Ok(self.probe.state(&spec).await?)
    }
}
