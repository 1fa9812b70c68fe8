use super::Node;
use crate::error::Result;

use ovn_membership::ServiceKind;
use ovn_ovsdb::DatabaseKind;
use tracing::info;

const DATABASES: [DatabaseKind; 2] = [DatabaseKind::Northbound, DatabaseKind::Southbound];

pub async fn db_status(node: &Node) -> Result<()> {
    if !node.local_service_active(ServiceKind::Central).await? {
        info!("{} is not registered for the central service", node.name());
    }

    for kind in DATABASES {
        match node.database_state(kind).await {
            Ok(state) => println!("{kind}: {state}"),
            Err(e) => println!("{kind}: error: {e}"),
        }
    }

    Ok(())
}
