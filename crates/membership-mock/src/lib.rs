//! Mock implementation of the membership interfaces for testing and local
//! development.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;

use config::Snapshot;
pub use error::Error;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use ovn_membership::{
    AddressDirectory, MembershipStore, Remote, ServiceFilter, ServiceKind, ServiceRecord,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    remotes: Vec<Remote>,
    services: Vec<ServiceRecord>,
}

/// In-memory membership store and address directory.
///
/// Records keep their registration order, which is the order every read
/// returns them in.
#[derive(Clone, Debug, Default)]
pub struct MockMembership {
    state: Arc<RwLock<State>>,
}

impl MockMembership {
    /// Create an empty mock membership.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mock membership from a snapshot file.
    ///
    /// Members are registered in file order, and each member's services in
    /// the order they are listed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The snapshot file cannot be read
    /// - The snapshot file contains invalid JSON
    /// - A service name is not a known service kind
    pub fn from_snapshot_file<P: AsRef<Path>>(snapshot_path: P) -> Result<Self, Error> {
        let mut file = File::open(snapshot_path)
            .map_err(|e| Error::SnapshotFile(format!("Failed to open snapshot file: {e}")))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::SnapshotFile(format!("Failed to read snapshot file: {e}")))?;

        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| Error::SnapshotFile(format!("Failed to parse snapshot file: {e}")))?;

        let mut state = State::default();
        for member in snapshot.members {
            for service in &member.services {
                let service = service
                    .parse::<ServiceKind>()
                    .map_err(|e| Error::SnapshotFile(e.to_string()))?;
                state
                    .services
                    .push(ServiceRecord::new(member.name.clone(), service));
            }

            state.remotes.push(Remote {
                name: member.name,
                address: member.address,
            });
        }

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Add (or move) a member in the address directory.
    pub async fn add_remote(&self, name: impl Into<String>, address: SocketAddr) {
        let name = name.into();
        let mut state = self.state.write().await;
        state.remotes.retain(|remote| remote.name != name);
        state.remotes.push(Remote { name, address });
    }

    /// Register `service` for `member` after every existing record.
    pub async fn register(&self, member: impl Into<String>, service: ServiceKind) {
        self.state
            .write()
            .await
            .services
            .push(ServiceRecord::new(member, service));
    }

    /// Remove a member and all its service records.
    ///
    /// # Errors
    ///
    /// Returns `Error::NodeNotFound` if the member is unknown.
    pub async fn remove_member(&self, name: &str) -> Result<(), Error> {
        let mut state = self.state.write().await;

        let before = state.remotes.len() + state.services.len();
        state.remotes.retain(|remote| remote.name != name);
        state.services.retain(|record| record.member != name);

        if before == state.remotes.len() + state.services.len() {
            return Err(Error::NodeNotFound(name.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl MembershipStore for MockMembership {
    type Error = Error;

    async fn get_services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceRecord>, Error> {
        Ok(self
            .state
            .read()
            .await
            .services
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AddressDirectory for MockMembership {
    type Error = Error;

    async fn remotes_by_name(&self) -> Result<HashMap<String, Remote>, Error> {
        Ok(self
            .state
            .read()
            .await
            .remotes
            .iter()
            .map(|remote| (remote.name.clone(), remote.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[tokio::test]
    async fn test_mock_membership() {
        let membership = MockMembership::new();
        membership
            .add_remote("node-a", "10.0.0.1:6443".parse().unwrap())
            .await;
        membership.register("node-a", ServiceKind::Central).await;
        membership.register("node-a", ServiceKind::Chassis).await;

        let central = membership
            .get_services(&ServiceFilter::service(ServiceKind::Central))
            .await
            .unwrap();
        assert_eq!(central, vec![ServiceRecord::new("node-a", ServiceKind::Central)]);

        let all = membership
            .get_services(&ServiceFilter::member("node-a"))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let remotes = membership.remotes_by_name().await.unwrap();
        assert_eq!(
            remotes.get("node-a").unwrap().address,
            "10.0.0.1:6443".parse().unwrap()
        );

        membership.remove_member("node-a").await.unwrap();
        assert!(membership.remotes_by_name().await.unwrap().is_empty());
        assert!(matches!(
            membership.remove_member("node-a").await,
            Err(Error::NodeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_from_snapshot_file_keeps_registration_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "members": [
                    {{ "name": "node-b", "address": "10.0.0.2:6443", "services": ["central", "switch"] }},
                    {{ "name": "node-a", "address": "[2001:db8::1]:6443", "services": ["central"] }}
                ]
            }}"#
        )
        .unwrap();

        let membership = MockMembership::from_snapshot_file(file.path()).unwrap();

        let central: Vec<String> = membership
            .get_services(&ServiceFilter::service(ServiceKind::Central))
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.member)
            .collect();
        assert_eq!(central, vec!["node-b", "node-a"]);
    }

    #[test]
    fn test_from_snapshot_file_rejects_unknown_service() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "members": [ {{ "name": "n", "address": "10.0.0.1:1", "services": ["gateway"] }} ] }}"#
        )
        .unwrap();

        assert!(matches!(
            MockMembership::from_snapshot_file(file.path()),
            Err(Error::SnapshotFile(_))
        ));
    }
}
