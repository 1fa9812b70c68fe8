use super::Node;
use crate::error::Result;

use tracing::info;

pub async fn bootstrap(node: &Node) -> Result<()> {
    let document = node.bootstrap().await?;

    info!(
        "{} bootstrapped, initial central member {}",
        node.name(),
        document.initial_nb
    );

    Ok(())
}
