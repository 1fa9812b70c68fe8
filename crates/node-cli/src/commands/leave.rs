use super::Node;
use crate::error::{Error, Result};

use ovn_departure::{DepartureReport, DepartureStep, StepOutcome};
use tracing::{info, warn};

pub async fn leave(node: &Node) -> Result<()> {
    let report = node.pre_remove().await;
    print!("{report}");

    exit_status(&report)
}

// Failed steps before cleanup are expected on a partial or repeated
// departure. Only a failed cleanup leaves state behind.
fn exit_status(report: &DepartureReport) -> Result<()> {
    if report.is_clean() {
        info!("{} left the cluster cleanly", report.node);
        return Ok(());
    }

    for (step, message) in report.failures() {
        warn!("{}: {}", step, message);
    }

    match report.outcome(DepartureStep::CleanupPaths) {
        Some(StepOutcome::Failed(message)) => Err(Error::CleanupFailed(message.clone())),
        _ => Ok(()),
    }
}
