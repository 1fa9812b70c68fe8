use std::fmt::{self, Display};
use std::path::PathBuf;

use async_trait::async_trait;
use ovn_paths::OvnPaths;
use tokio::fs;

/// Transport used by OVN database endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Protocol {
    /// Plain TCP.
    Tcp,

    /// TLS, used whenever the cluster has a CA.
    Ssl,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Ssl => f.write_str("ssl"),
        }
    }
}

/// Tells whether a certificate authority is configured for the cluster.
#[async_trait]
pub trait CaSource
where
    Self: Send + Sync + Clone + 'static,
{
    /// Returns true if a CA is configured.
    async fn has_ca(&self) -> bool;

    /// The protocol endpoints should use.
    async fn protocol(&self) -> Protocol {
        if self.has_ca().await {
            Protocol::Ssl
        } else {
            Protocol::Tcp
        }
    }
}

/// Reports a CA when both the CA certificate and key exist on disk.
#[derive(Clone, Debug)]
pub struct PkiCaSource {
    cert_file: PathBuf,
    key_file: PathBuf,
}

impl PkiCaSource {
    /// Uses the CA files of the node's PKI directory.
    #[must_use]
    pub fn new(paths: &OvnPaths) -> Self {
        Self {
            cert_file: paths.ca_cert_file(),
            key_file: paths.ca_key_file(),
        }
    }
}

#[async_trait]
impl CaSource for PkiCaSource {
    async fn has_ca(&self) -> bool {
        matches!(fs::try_exists(&self.cert_file).await, Ok(true))
            && matches!(fs::try_exists(&self.key_file).await, Ok(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[tokio::test]
    async fn test_pki_ca_requires_cert_and_key() {
        let dir = tempdir().unwrap();
        let paths = OvnPaths::new(dir.path());
        let ca = PkiCaSource::new(&paths);
        std::fs::create_dir_all(paths.pki_dir()).unwrap();

        assert_eq!(ca.protocol().await, Protocol::Tcp);

        std::fs::write(paths.ca_cert_file(), b"cert").unwrap();
        assert_eq!(ca.protocol().await, Protocol::Tcp);

        std::fs::write(paths.ca_key_file(), b"key").unwrap();
        assert_eq!(ca.protocol().await, Protocol::Ssl);
    }
}
