use std::net::SocketAddr;

use serde::Deserialize;

/// Member definition in the membership snapshot file
#[derive(Debug, Deserialize)]
pub struct SnapshotMember {
    pub name: String,
    pub address: SocketAddr,
    #[serde(default)]
    pub services: Vec<String>,
}

/// Membership snapshot file
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub members: Vec<SnapshotMember>,
}
