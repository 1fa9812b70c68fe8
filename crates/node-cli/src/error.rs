use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("local state was not cleaned up, manual intervention required: {0}")]
    CleanupFailed(String),

    #[error(transparent)]
    Control(#[from] ovn_control::Error),

    #[error(transparent)]
    Membership(#[from] ovn_membership_mock::Error),

    #[error(transparent)]
    Node(#[from] ovn_node::Error),
}
