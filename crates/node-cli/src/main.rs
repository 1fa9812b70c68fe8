//! Binary to manage a node's membership in the OVN cluster.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod commands;
mod error;

use error::Result;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let node = commands::node(&cli.node)?;

    match cli.command {
        Commands::Bootstrap => commands::bootstrap(&node).await,
        Commands::GenerateEnv => commands::generate_env(&node).await,
        Commands::Leave => commands::leave(&node).await,
        Commands::DbStatus => commands::db_status(&node).await,
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    node: NodeArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the runtime directories and write the environment file
    Bootstrap,
    /// Regenerate the environment file from current membership
    GenerateEnv,
    /// Leave the cluster, back up local data and remove runtime state
    Leave,
    /// Show the cluster state of the local database servers
    DbStatus,
}

#[derive(Parser, Debug)]
struct NodeArgs {
    /// Directory of ovn-appctl, looked up on PATH if unset
    #[arg(long, env = "OVN_NODE_APPCTL_BIN_DIR")]
    appctl_bin_dir: Option<PathBuf>,

    /// Seconds to wait for each database to leave the cluster
    #[arg(long, default_value_t = 30, env = "OVN_NODE_DB_WAIT_SECS")]
    db_wait_secs: u64,

    /// Address other members reach this node on
    #[arg(long, env = "OVN_NODE_LOCAL_ADDRESS")]
    local_address: IpAddr,

    /// Membership snapshot (JSON)
    #[arg(
        long,
        default_value = "/var/lib/ovn-node/membership.json",
        env = "OVN_NODE_MEMBERSHIP_FILE"
    )]
    membership_file: PathBuf,

    /// Name this node is registered under
    #[arg(long, env = "OVN_NODE_NAME")]
    name: String,

    /// Root of the runtime directories
    #[arg(
        long,
        default_value = "/var/lib/ovn-node",
        env = "OVN_NODE_ROOT"
    )]
    root: PathBuf,

    /// Prefix of the systemd units running the node services
    #[arg(long, default_value = "ovn-", env = "OVN_NODE_UNIT_PREFIX")]
    unit_prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_node_args() {
        let cli = Cli::try_parse_from([
            "ovn-node",
            "--name",
            "node-a",
            "--local-address",
            "2001:db8::1",
            "--db-wait-secs",
            "5",
            "leave",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Leave));
        assert_eq!(cli.node.name, "node-a");
        assert_eq!(cli.node.db_wait_secs, 5);
        assert_eq!(cli.node.root, PathBuf::from("/var/lib/ovn-node"));
    }
}
