use crate::connection::bracketed;
use crate::{CaSource, ConnectionStringBuilder, EnvironmentDocument, Result};

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use ovn_membership::{AddressDirectory, AddressResolver, MembershipStore, ServiceKind};
use tracing::info;

/// Port of the Northbound database.
pub const NB_PORT: u16 = 6641;

/// Port of the Southbound database.
pub const SB_PORT: u16 = 6642;

/// Options for creating a new `EnvironmentProjector`.
pub struct EnvironmentProjectorOptions<M, D, C>
where
    M: MembershipStore,
    D: AddressDirectory,
    C: CaSource,
{
    /// Decides between `ssl` and `tcp` endpoints.
    pub ca_source: C,

    /// Where members can be reached.
    pub directory: D,

    /// The environment file to maintain.
    pub env_file: PathBuf,

    /// This node's address.
    pub local_address: IpAddr,

    /// Which member runs which service.
    pub store: M,
}

/// Regenerates the environment file from cluster membership.
#[derive(Clone, Debug)]
pub struct EnvironmentProjector<M, D, C>
where
    M: MembershipStore,
    D: AddressDirectory,
    C: CaSource,
{
    builder: ConnectionStringBuilder<M, D, C>,
    env_file: PathBuf,
    local_address: IpAddr,
}

impl<M, D, C> EnvironmentProjector<M, D, C>
where
    M: MembershipStore,
    D: AddressDirectory,
    C: CaSource,
{
    /// Creates a new `EnvironmentProjector`.
    pub fn new(
        EnvironmentProjectorOptions {
            ca_source,
            directory,
            env_file,
            local_address,
            store,
        }: EnvironmentProjectorOptions<M, D, C>,
    ) -> Self {
        Self {
            builder: ConnectionStringBuilder::new(AddressResolver::new(store, directory), ca_source),
            env_file,
            local_address,
        }
    }

    /// The connection string builder.
    pub const fn builder(&self) -> &ConnectionStringBuilder<M, D, C> {
        &self.builder
    }

    /// The environment file this projector maintains.
    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    /// Computes the environment from current membership without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if membership cannot be read or no central member with
    /// a known address is registered first.
    pub async fn document(&self) -> Result<EnvironmentDocument> {
        let initial = self.builder.initial_address(ServiceKind::Central).await?;
        let nb_connect = self
            .builder
            .connect_string(ServiceKind::Central, NB_PORT)
            .await?;
        let sb_connect = self
            .builder
            .connect_string(ServiceKind::Central, SB_PORT)
            .await?;

        Ok(EnvironmentDocument {
            initial_nb: initial.clone(),
            initial_sb: initial,
            nb_connect,
            sb_connect,
            local_ip: bracketed(self.local_address),
        })
    }

    /// Regenerates the environment file. The file is untouched unless every
    /// value could be computed.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be computed or written.
    pub async fn generate(&self) -> Result<EnvironmentDocument> {
        let document = self.document().await?;
        document.write_to(&self.env_file).await?;

        info!(
            "generated {} (nb: {}, sb: {})",
            self.env_file.display(),
            document.nb_connect,
            document.sb_connect
        );

        Ok(document)
    }
}
