use std::fmt::{self, Display};

use tracing::{debug, warn};

/// The steps of a departure, in the order they run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DepartureStep {
    /// Ask `ovn-controller` to exit, deregistering the chassis.
    ExitController,

    /// Stop the chassis service.
    StopChassis,

    /// Stop the switch service.
    StopSwitch,

    /// Leave the Northbound cluster.
    LeaveNorthbound,

    /// Leave the Southbound cluster.
    LeaveSouthbound,

    /// Wait for the local Northbound server to report it has left.
    AwaitNorthboundDeparture,

    /// Wait for the local Southbound server to report it has left.
    AwaitSouthboundDeparture,

    /// Stop the central service.
    StopCentral,

    /// Back up and remove the runtime directories.
    CleanupPaths,
}

impl DepartureStep {
    /// Every step, in execution order.
    pub const ALL: [Self; 9] = [
        Self::ExitController,
        Self::StopChassis,
        Self::StopSwitch,
        Self::LeaveNorthbound,
        Self::LeaveSouthbound,
        Self::AwaitNorthboundDeparture,
        Self::AwaitSouthboundDeparture,
        Self::StopCentral,
        Self::CleanupPaths,
    ];

    /// The name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExitController => "exit-controller",
            Self::StopChassis => "stop-chassis",
            Self::StopSwitch => "stop-switch",
            Self::LeaveNorthbound => "leave-northbound",
            Self::LeaveSouthbound => "leave-southbound",
            Self::AwaitNorthboundDeparture => "await-northbound-departure",
            Self::AwaitSouthboundDeparture => "await-southbound-departure",
            Self::StopCentral => "stop-central",
            Self::CleanupPaths => "cleanup-paths",
        }
    }
}

impl Display for DepartureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a step ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// The step succeeded.
    Completed,

    /// The step failed; the departure carried on.
    Failed(String),
}

/// What happened during a departure.
#[derive(Clone, Debug)]
pub struct DepartureReport {
    /// The node that left.
    pub node: String,

    /// Each step that ran, in order.
    pub steps: Vec<(DepartureStep, StepOutcome)>,
}

impl DepartureReport {
    pub(crate) fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            steps: Vec::with_capacity(DepartureStep::ALL.len()),
        }
    }

    pub(crate) fn record<E>(&mut self, step: DepartureStep, result: Result<(), E>)
    where
        E: Display,
    {
        let outcome = match result {
            Ok(()) => {
                debug!("{}: {} completed", self.node, step);
                StepOutcome::Completed
            }
            Err(e) => {
                warn!("{}: {} failed: {}", self.node, step, e);
                StepOutcome::Failed(e.to_string())
            }
        };

        self.steps.push((step, outcome));
    }

    /// Returns true if every step completed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The steps that failed, with their error messages.
    pub fn failures(&self) -> impl Iterator<Item = (DepartureStep, &str)> {
        self.steps.iter().filter_map(|(step, outcome)| match outcome {
            StepOutcome::Completed => None,
            StepOutcome::Failed(message) => Some((*step, message.as_str())),
        })
    }

    /// How `step` ended, if it ran.
    #[must_use]
    pub fn outcome(&self, step: DepartureStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }
}

impl Display for DepartureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "departure of {}:", self.node)?;
        for (step, outcome) in &self.steps {
            match outcome {
                StepOutcome::Completed => writeln!(f, "  {step}: ok")?,
                StepOutcome::Failed(message) => writeln!(f, "  {step}: failed: {message}")?,
            }
        }

        Ok(())
    }
}
