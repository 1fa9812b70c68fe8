use crate::{DatabaseSpec, DatabaseState, Error, PollError, Result, StatusProbe, poll_until};

use std::time::Duration;

use tracing::{debug, info};

/// How long to wait for a database to reach a state by default.
pub const DEFAULT_DB_WAIT: Duration = Duration::from_secs(30);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Waits for a database server to report a cluster state.
#[derive(Clone, Debug)]
pub struct MembershipWaiter<P>
where
    P: StatusProbe,
{
    poll_interval: Option<Duration>,
    probe: P,
}

impl<P> MembershipWaiter<P>
where
    P: StatusProbe,
{
    /// Creates a waiter polling `probe` at a hundredth of each timeout.
    pub const fn new(probe: P) -> Self {
        Self {
            poll_interval: None,
            probe,
        }
    }

    /// Polls at a fixed `interval` instead.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Returns once the database reports `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Timeout` if `target` is not seen within `timeout`, or
    /// the probe's error if it fails.
    pub async fn wait_for(
        &self,
        spec: &DatabaseSpec,
        target: DatabaseState,
        timeout: Duration,
    ) -> Result<()> {
        let interval = self
            .poll_interval
            .unwrap_or_else(|| (timeout / 100).max(MIN_POLL_INTERVAL));

        debug!(
            "waiting up to {:?} for {} to be {} (every {:?})",
            timeout, spec.kind, target, interval
        );

        let probe = &self.probe;
        poll_until(interval, timeout, || async move {
            Ok::<_, Error>(probe.state(spec).await? == target)
        })
        .await
        .map_err(|e| match e {
            PollError::Timeout(timeout) => Error::Timeout {
                database: spec.kind,
                target,
                timeout,
            },
            PollError::Failed(e) => e,
        })?;

        info!("{} is {}", spec.kind, target);

        Ok(())
    }
}
