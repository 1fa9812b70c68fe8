//! Graceful departure of a node from the OVN cluster.
//!
//! A departure is a fixed sequence of steps. Each step may fail on its own
//! without stopping the ones after it: the outcome of every step is logged
//! and collected in a [`DepartureReport`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod report;

pub use report::{DepartureReport, DepartureStep, StepOutcome};

use std::time::Duration;

use ovn_control::{AdminControl, ServiceControl};
use ovn_membership::ServiceKind;
use ovn_ovsdb::{DatabaseKind, DatabaseSpec, DatabaseState, MembershipWaiter, StatusProbe};
use ovn_paths::{Filesystem, LocalFilesystem, PathLifecycle};
use tracing::info;

/// Options for creating a new `DepartureOrchestrator`.
pub struct DepartureOrchestratorOptions<A, S, P, F = LocalFilesystem>
where
    A: AdminControl,
    S: ServiceControl,
    P: StatusProbe,
    F: Filesystem,
{
    /// Sends commands to the local daemons.
    pub admin: A,

    /// How long to wait for each database to report it has left.
    pub db_wait: Duration,

    /// Owns the runtime directories.
    pub lifecycle: PathLifecycle<F>,

    /// Stops the node services.
    pub services: S,

    /// Watches the local database servers.
    pub waiter: MembershipWaiter<P>,
}

/// Runs the departure of a node.
#[derive(Clone, Debug)]
pub struct DepartureOrchestrator<A, S, P, F = LocalFilesystem>
where
    A: AdminControl,
    S: ServiceControl,
    P: StatusProbe,
    F: Filesystem,
{
    admin: A,
    db_wait: Duration,
    lifecycle: PathLifecycle<F>,
    services: S,
    waiter: MembershipWaiter<P>,
}

impl<A, S, P, F> DepartureOrchestrator<A, S, P, F>
where
    A: AdminControl,
    S: ServiceControl,
    P: StatusProbe,
    F: Filesystem,
{
    /// Creates a new `DepartureOrchestrator`.
    pub fn new(
        DepartureOrchestratorOptions {
            admin,
            db_wait,
            lifecycle,
            services,
            waiter,
        }: DepartureOrchestratorOptions<A, S, P, F>,
    ) -> Self {
        Self {
            admin,
            db_wait,
            lifecycle,
            services,
            waiter,
        }
    }

    /// Takes `node` out of the cluster and removes its local state.
    ///
    /// Every step runs regardless of earlier failures. Running it again on a
    /// node that already left only records failures for the steps that no
    /// longer apply.
    pub async fn leave(&self, node: &str) -> DepartureReport {
        info!("{} is leaving the cluster", node);

        let paths = self.lifecycle.paths();
        let mut report = DepartureReport::new(node);

        // Deregisters the chassis from the Southbound database.
        let result = self
            .admin
            .call(&paths.controller_control_socket(), "exit", &[])
            .await
            .map(drop);
        report.record(DepartureStep::ExitController, result);

        let result = self.services.stop(ServiceKind::Chassis, true).await;
        report.record(DepartureStep::StopChassis, result);

        let result = self.services.stop(ServiceKind::Switch, true).await;
        report.record(DepartureStep::StopSwitch, result);

        let result = self.leave_cluster(DatabaseKind::Northbound).await;
        report.record(DepartureStep::LeaveNorthbound, result);

        let result = self.leave_cluster(DatabaseKind::Southbound).await;
        report.record(DepartureStep::LeaveSouthbound, result);

        let result = self.await_departure(DatabaseKind::Northbound).await;
        report.record(DepartureStep::AwaitNorthboundDeparture, result);

        let result = self.await_departure(DatabaseKind::Southbound).await;
        report.record(DepartureStep::AwaitSouthboundDeparture, result);

        let result = self.services.stop(ServiceKind::Central, true).await;
        report.record(DepartureStep::StopCentral, result);

        let result = self.lifecycle.teardown().await.map(drop);
        report.record(DepartureStep::CleanupPaths, result);

        if report.is_clean() {
            info!("{} left the cluster", node);
        } else {
            info!(
                "{} left the cluster with {} failed step(s)",
                node,
                report.failures().count()
            );
        }

        report
    }

    async fn leave_cluster(&self, kind: DatabaseKind) -> Result<(), ovn_control::Error> {
        let spec = DatabaseSpec::new(kind, self.lifecycle.paths());

        self.admin
            .call(&spec.control_socket, "cluster/leave", &[kind.db_name()])
            .await
            .map(drop)
    }

    async fn await_departure(&self, kind: DatabaseKind) -> Result<(), ovn_ovsdb::Error> {
        let spec = DatabaseSpec::new(kind, self.lifecycle.paths());

        self.waiter
            .wait_for(&spec, DatabaseState::Removed, self.db_wait)
            .await
    }
}
