//! Resolves service membership to network addresses.

use std::net::IpAddr;

use tracing::debug;

use crate::{
    AddressDirectory, Error, MembershipError, MembershipStore, ServiceFilter, ServiceKind,
    ServiceRecord,
};

/// A registered member together with the address it can be reached on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedMember {
    /// The name of the member.
    pub member: String,

    /// The IP address of the member.
    pub address: IpAddr,
}

/// Joins service records from a `MembershipStore` with the addresses held by
/// an `AddressDirectory`.
#[derive(Clone, Debug)]
pub struct AddressResolver<M, D>
where
    M: MembershipStore,
    D: AddressDirectory,
{
    directory: D,
    store: M,
}

impl<M, D> AddressResolver<M, D>
where
    M: MembershipStore,
    D: AddressDirectory,
{
    /// Creates a new `AddressResolver`.
    pub const fn new(store: M, directory: D) -> Self {
        Self { directory, store }
    }

    /// Returns every member registered for `service` that has a known
    /// address, in the store's order. Members without an address are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or the directory cannot be read.
    pub async fn resolve(&self, service: ServiceKind) -> Result<Vec<ResolvedMember>, Error> {
        let records = self.records(service).await?;
        let remotes = self
            .directory
            .remotes_by_name()
            .await
            .map_err(|e| Error::Directory(e.kind(), e.to_string()))?;

        let mut resolved = Vec::with_capacity(records.len());
        for record in records {
            let Some(remote) = remotes.get(&record.member) else {
                debug!(
                    "skipping {} member {} with no known address",
                    service, record.member
                );
                continue;
            };

            resolved.push(ResolvedMember {
                member: record.member,
                address: remote.address.ip(),
            });
        }

        Ok(resolved)
    }

    /// Returns the first member registered for `service`.
    ///
    /// Only the first record is considered: if it has no address the call
    /// fails rather than falling through to later members.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoMembers` if nothing is registered for the service and
    /// `Error::RemoteNotFound` if the first member has no known address.
    pub async fn initial_member(&self, service: ServiceKind) -> Result<ResolvedMember, Error> {
        let first = self
            .records(service)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoMembers(service))?;

        let remotes = self
            .directory
            .remotes_by_name()
            .await
            .map_err(|e| Error::Directory(e.kind(), e.to_string()))?;

        let remote = remotes
            .get(&first.member)
            .ok_or_else(|| Error::RemoteNotFound(first.member.clone()))?;

        Ok(ResolvedMember {
            address: remote.address.ip(),
            member: first.member,
        })
    }

    /// Returns true if `member` is registered for `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn local_service_active(
        &self,
        member: &str,
        service: ServiceKind,
    ) -> Result<bool, Error> {
        let services = self
            .store
            .get_services(&ServiceFilter::member(member))
            .await
            .map_err(|e| Error::Store(e.kind(), e.to_string()))?;

        Ok(services.iter().any(|record| record.service == service))
    }

    async fn records(&self, service: ServiceKind) -> Result<Vec<ServiceRecord>, Error> {
        self.store
            .get_services(&ServiceFilter::service(service))
            .await
            .map_err(|e| Error::Store(e.kind(), e.to_string()))
    }
}
