use std::net::IpAddr;

use ovn_environment::{
    EnvironmentDocument, EnvironmentProjector, EnvironmentProjectorOptions, Error, PkiCaSource,
};
use ovn_membership::ServiceKind;
use ovn_membership_mock::MockMembership;
use ovn_paths::OvnPaths;
use tempfile::tempdir;

fn projector(
    paths: &OvnPaths,
    membership: &MockMembership,
    local_address: IpAddr,
) -> EnvironmentProjector<MockMembership, MockMembership, PkiCaSource> {
    EnvironmentProjector::new(EnvironmentProjectorOptions {
        ca_source: PkiCaSource::new(paths),
        directory: membership.clone(),
        env_file: paths.env_file(),
        local_address,
        store: membership.clone(),
    })
}

#[tokio::test]
async fn test_generate_writes_ipv6_environment_with_ssl() {
    let dir = tempdir().unwrap();
    let paths = OvnPaths::new(dir.path());
    std::fs::create_dir_all(paths.pki_dir()).unwrap();
    std::fs::write(paths.ca_cert_file(), b"cert").unwrap();
    std::fs::write(paths.ca_key_file(), b"key").unwrap();

    let membership = MockMembership::new();
    membership
        .add_remote("node-a", "[2001:db8::1]:0".parse().unwrap())
        .await;
    membership
        .add_remote("node-b", "[2001:db8::2]:0".parse().unwrap())
        .await;
    membership.register("node-a", ServiceKind::Central).await;
    membership.register("node-b", ServiceKind::Central).await;
    membership.register("node-b", ServiceKind::Chassis).await;

    let projector = projector(&paths, &membership, "2001:db8::2".parse().unwrap());
    let document = projector.generate().await.unwrap();

    assert_eq!(
        document,
        EnvironmentDocument {
            initial_nb: "[2001:db8::1]".to_string(),
            initial_sb: "[2001:db8::1]".to_string(),
            nb_connect: "ssl:[2001:db8::1]:6641,ssl:[2001:db8::2]:6641".to_string(),
            sb_connect: "ssl:[2001:db8::1]:6642,ssl:[2001:db8::2]:6642".to_string(),
            local_ip: "[2001:db8::2]".to_string(),
        }
    );
    assert_eq!(
        EnvironmentDocument::read_from(paths.env_file()).await.unwrap(),
        document
    );
}

#[tokio::test]
async fn test_generate_uses_tcp_without_ca() {
    let dir = tempdir().unwrap();
    let paths = OvnPaths::new(dir.path());

    let membership = MockMembership::new();
    membership
        .add_remote("node-a", "[2001:db8::1]:0".parse().unwrap())
        .await;
    membership.register("node-a", ServiceKind::Central).await;

    let projector = projector(&paths, &membership, "10.0.0.9".parse().unwrap());
    let document = projector.generate().await.unwrap();

    assert_eq!(document.nb_connect, "tcp:[2001:db8::1]:6641");
    assert_eq!(document.sb_connect, "tcp:[2001:db8::1]:6642");
    assert_eq!(document.local_ip, "10.0.0.9");
}

#[tokio::test]
async fn test_generate_without_central_member_writes_nothing() {
    let dir = tempdir().unwrap();
    let paths = OvnPaths::new(dir.path());

    let membership = MockMembership::new();
    membership
        .add_remote("node-a", "10.0.0.1:0".parse().unwrap())
        .await;
    membership.register("node-a", ServiceKind::Chassis).await;

    let projector = projector(&paths, &membership, "10.0.0.1".parse().unwrap());

    assert!(matches!(
        projector.generate().await,
        Err(Error::Membership(ovn_membership::Error::NoMembers(
            ServiceKind::Central
        )))
    ));
    assert!(!paths.env_file().exists());
    assert!(!paths.data_dir().exists());
}

#[tokio::test]
async fn test_regenerates_after_membership_change() {
    let dir = tempdir().unwrap();
    let paths = OvnPaths::new(dir.path());

    let membership = MockMembership::new();
    membership
        .add_remote("node-a", "10.0.0.1:0".parse().unwrap())
        .await;
    membership
        .add_remote("node-b", "10.0.0.2:0".parse().unwrap())
        .await;
    membership.register("node-a", ServiceKind::Central).await;
    membership.register("node-b", ServiceKind::Central).await;

    let projector = projector(&paths, &membership, "10.0.0.2".parse().unwrap());
    projector.generate().await.unwrap();

    membership.remove_member("node-a").await.unwrap();
    let document = projector.generate().await.unwrap();

    assert_eq!(document.initial_nb, "10.0.0.2");
    assert_eq!(document.nb_connect, "tcp:10.0.0.2:6641");
    assert_eq!(
        EnvironmentDocument::read_from(paths.env_file()).await.unwrap(),
        document
    );
}
