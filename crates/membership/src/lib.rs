//! Abstract interface for reading cluster membership: which member runs which
//! service, and where each member can be reached.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod resolver;

pub use error::{Error, MembershipError, MembershipErrorKind};
pub use resolver::{AddressResolver, ResolvedMember};

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::net::SocketAddr;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The services a member can run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Hosts the Northbound and Southbound database servers and `ovn-northd`.
    Central,

    /// Runs `ovn-controller`, representing the node in the Southbound database.
    Chassis,

    /// Runs the local Open vSwitch datapath.
    Switch,
}

impl ServiceKind {
    /// The lowercase name used in the membership store and for service units.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::Chassis => "chassis",
            Self::Switch => "switch",
        }
    }
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "central" => Ok(Self::Central),
            "chassis" => Ok(Self::Chassis),
            "switch" => Ok(Self::Switch),
            other => Err(Error::UnknownService(other.to_string())),
        }
    }
}

/// A member running a service.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// The name of the member.
    pub member: String,

    /// The service the member runs.
    pub service: ServiceKind,
}

impl ServiceRecord {
    /// Creates a new `ServiceRecord`.
    pub fn new(member: impl Into<String>, service: ServiceKind) -> Self {
        Self {
            member: member.into(),
            service,
        }
    }
}

/// Selects service records. Unset fields match anything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ServiceFilter {
    /// Only records for this member.
    pub member: Option<String>,

    /// Only records for this service.
    pub service: Option<ServiceKind>,
}

impl ServiceFilter {
    /// A filter matching every record of `member`.
    pub fn member(member: impl Into<String>) -> Self {
        Self {
            member: Some(member.into()),
            service: None,
        }
    }

    /// A filter matching every record of `service`.
    #[must_use]
    pub const fn service(service: ServiceKind) -> Self {
        Self {
            member: None,
            service: Some(service),
        }
    }

    /// Returns true if `record` satisfies every set field of this filter.
    #[must_use]
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        self.member.as_ref().is_none_or(|m| *m == record.member)
            && self.service.is_none_or(|s| s == record.service)
    }
}

/// A cluster peer known to the address directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Remote {
    /// The name of the member.
    pub name: String,

    /// The cluster address of the member.
    pub address: SocketAddr,
}

/// Transactional read access to the service registry.
#[async_trait]
pub trait MembershipStore
where
    Self: Send + Sync + Clone + 'static,
{
    /// The error type for this store.
    type Error: MembershipError;

    /// Returns every record matching `filter`, read inside a single
    /// transaction, in the store's registration order.
    async fn get_services(&self, filter: &ServiceFilter)
    -> Result<Vec<ServiceRecord>, Self::Error>;
}

/// Read-only mapping from member name to network address.
#[async_trait]
pub trait AddressDirectory
where
    Self: Send + Sync + Clone + 'static,
{
    /// The error type for this directory.
    type Error: MembershipError;

    /// Returns every known remote keyed by member name.
    async fn remotes_by_name(&self) -> Result<HashMap<String, Remote>, Self::Error>;
}
