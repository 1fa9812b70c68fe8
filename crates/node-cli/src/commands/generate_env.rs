use super::Node;
use crate::error::Result;

pub async fn generate_env(node: &Node) -> Result<()> {
    let document = node.generate_environment().await?;
    print!("{}", document.render());

    Ok(())
}
