use crate::{CaSource, Result};

use std::net::{IpAddr, SocketAddr};

use ovn_membership::{AddressDirectory, AddressResolver, MembershipStore, ServiceKind};

/// Formats an IP the way OVN expects it outside of a socket address:
/// IPv6 literals are bracketed.
#[must_use]
pub fn bracketed(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(ip) => ip.to_string(),
        IpAddr::V6(ip) => format!("[{ip}]"),
    }
}

/// Builds OVN database connection strings from cluster membership.
#[derive(Clone, Debug)]
pub struct ConnectionStringBuilder<M, D, C>
where
    M: MembershipStore,
    D: AddressDirectory,
    C: CaSource,
{
    ca: C,
    resolver: AddressResolver<M, D>,
}

impl<M, D, C> ConnectionStringBuilder<M, D, C>
where
    M: MembershipStore,
    D: AddressDirectory,
    C: CaSource,
{
    /// Creates a new `ConnectionStringBuilder`.
    pub const fn new(resolver: AddressResolver<M, D>, ca: C) -> Self {
        Self { ca, resolver }
    }

    /// The resolver backing this builder.
    pub const fn resolver(&self) -> &AddressResolver<M, D> {
        &self.resolver
    }

    /// Returns `protocol:ip:port` for every member of `service` with a known
    /// address, in store order, joined with `,`.
    ///
    /// # Errors
    ///
    /// Returns an error if membership cannot be read.
    pub async fn connect_string(&self, service: ServiceKind, port: u16) -> Result<String> {
        let protocol = self.ca.protocol().await;
        let members = self.resolver.resolve(service).await?;

        Ok(members
            .iter()
            .map(|m| format!("{protocol}:{}", SocketAddr::new(m.address, port)))
            .collect::<Vec<_>>()
            .join(","))
    }

    /// Returns the bracketed address of the first member registered for
    /// `service`.
    ///
    /// # Errors
    ///
    /// Returns `ovn_membership::Error::NoMembers` if nothing is registered and
    /// `ovn_membership::Error::RemoteNotFound` if the first member has no
    /// known address.
    pub async fn initial_address(&self, service: ServiceKind) -> Result<String> {
        let member = self.resolver.initial_member(service).await?;

        Ok(bracketed(member.address))
    }
}
