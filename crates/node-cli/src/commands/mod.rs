mod bootstrap;
mod db_status;
mod generate_env;
mod leave;

pub use bootstrap::bootstrap;
pub use db_status::db_status;
pub use generate_env::generate_env;
pub use leave::leave;

use crate::NodeArgs;
use crate::error::Result;

use std::time::Duration;

use ovn_control::{AppCtl, AppCtlOptions, SystemdServices, SystemdServicesOptions};
use ovn_membership_mock::MockMembership;
use ovn_node::{OvnNode, OvnNodeOptions};
use ovn_paths::OvnPaths;

const SERVICE_TIMEOUT: Duration = Duration::from_secs(60);

pub type Node = OvnNode<MockMembership, MockMembership, AppCtl, SystemdServices>;

pub fn node(args: &NodeArgs) -> Result<Node> {
    let membership = MockMembership::from_snapshot_file(&args.membership_file)?;

    let admin = AppCtl::new(AppCtlOptions {
        bin_dir: args.appctl_bin_dir.clone(),
        ..AppCtlOptions::default()
    })?;

    let services = SystemdServices::new(SystemdServicesOptions {
        unit_prefix: args.unit_prefix.clone(),
        timeout: SERVICE_TIMEOUT,
    });

    Ok(OvnNode::new(OvnNodeOptions {
        admin,
        db_wait: Duration::from_secs(args.db_wait_secs),
        directory: membership.clone(),
        local_address: args.local_address,
        name: args.name.clone(),
        paths: OvnPaths::new(&args.root),
        services,
        store: membership,
    }))
}
