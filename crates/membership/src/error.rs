use std::fmt::{self, Debug, Display};

use thiserror::Error;

use crate::ServiceKind;

/// Errors raised while resolving membership.
#[derive(Debug, Error)]
pub enum Error {
    /// The address directory could not be read.
    #[error("address directory error ({0}): {1}")]
    Directory(MembershipErrorKind, String),

    /// No member is registered for the service.
    #[error("no members registered for the {0} service")]
    NoMembers(ServiceKind),

    /// A registered member has no entry in the address directory.
    #[error("remote couldn't be found for {0:?}")]
    RemoteNotFound(String),

    /// The membership store could not be read.
    #[error("membership store error ({0}): {1}")]
    Store(MembershipErrorKind, String),

    /// A service name that is not one of the known kinds.
    #[error("unknown service kind: {0}")]
    UnknownService(String),
}

/// The kind of membership collaborator error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MembershipErrorKind {
    /// A requested member does not exist.
    NodeNotFound,

    /// Other/unknown error
    Other,
}

impl Display for MembershipErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker trait for `MembershipStore` and `AddressDirectory` errors
pub trait MembershipError: Debug + std::error::Error + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> MembershipErrorKind;
}
