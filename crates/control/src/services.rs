use crate::{Error, Result, ServiceControl};

use std::time::Duration;

use async_trait::async_trait;
use ovn_membership::ServiceKind;
use systemctl::SystemCtl;
use tracing::{debug, info};

/// Options for configuring `SystemdServices`.
#[derive(Clone, Debug)]
pub struct SystemdServicesOptions {
    /// Prefix of every unit name, e.g. `ovn-` for `ovn-central.service`.
    pub unit_prefix: String,

    /// Budget for a single start/stop.
    pub timeout: Duration,
}

/// Controls node services as systemd units.
#[derive(Clone, Debug)]
pub struct SystemdServices {
    timeout: Duration,
    unit_prefix: String,
}

impl SystemdServices {
    /// Creates a new `SystemdServices`.
    #[must_use]
    pub fn new(
        SystemdServicesOptions {
            unit_prefix,
            timeout,
        }: SystemdServicesOptions,
    ) -> Self {
        Self {
            timeout,
            unit_prefix,
        }
    }

    /// The unit backing `service`.
    #[must_use]
    pub fn unit_name(&self, service: ServiceKind) -> String {
        format!("{}{}.service", self.unit_prefix, service)
    }
}

#[async_trait]
impl ServiceControl for SystemdServices {
    async fn stop(&self, service: ServiceKind, force: bool) -> Result<()> {
        let unit = self.unit_name(service);
        let description = format!("systemctl stop {unit}");

        let task = tokio::task::spawn_blocking(move || -> Result<()> {
            let systemctl = SystemCtl::default();

            if force
                && !systemctl
                    .is_active(&unit)
                    .map_err(|e| Error::Io("failed to query unit state", e))?
            {
                debug!("{} is not active, nothing to stop", unit);
                return Ok(());
            }

            let status = systemctl
                .stop(&unit)
                .map_err(|e| Error::Io("failed to stop unit", e))?;

            if !status.success() {
                return Err(Error::NonZeroExit {
                    command: format!("systemctl stop {unit}"),
                    status,
                    stderr: String::new(),
                });
            }

            info!("stopped {}", unit);

            Ok(())
        });

        tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| Error::Timeout(description, self.timeout))??
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_name() {
        let services = SystemdServices::new(SystemdServicesOptions {
            unit_prefix: "ovn-".to_string(),
            timeout: Duration::from_secs(30),
        });

        assert_eq!(services.unit_name(ServiceKind::Central), "ovn-central.service");
        assert_eq!(services.unit_name(ServiceKind::Chassis), "ovn-chassis.service");
        assert_eq!(services.unit_name(ServiceKind::Switch), "ovn-switch.service");
    }
}
