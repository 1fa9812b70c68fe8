use thiserror::Error;

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing the node.
#[derive(Debug, Error)]
pub enum Error {
    /// The environment could not be generated.
    #[error(transparent)]
    Environment(#[from] ovn_environment::Error),

    /// Membership could not be read.
    #[error(transparent)]
    Membership(#[from] ovn_membership::Error),

    /// A database could not be inspected.
    #[error(transparent)]
    Ovsdb(#[from] ovn_ovsdb::Error),

    /// The runtime directories could not be created.
    #[error(transparent)]
    Paths(#[from] ovn_paths::Error),
}
