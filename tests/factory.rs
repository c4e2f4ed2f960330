use ech_connect::config::NetworkConfig;
use ech_connect::error::EchConnectError;
use ech_connect::{EchProvider, Settings, TlsSocketFactory};
use rustls::RootCertStore;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

const RESOLVED: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7));

fn test_factory(doh_url: &str, extra_hosts: &[&str]) -> TlsSocketFactory {
    let provider = Arc::new(EchProvider::with_root_store(RootCertStore::empty()).unwrap());
    let config = NetworkConfig {
        doh_url: doh_url.to_string(),
        extra_builtin_hosts: extra_hosts.iter().map(|h| h.to_string()).collect(),
        request_timeout_secs: 5,
    };
    let settings = Arc::new(Settings::new(&config));
    TlsSocketFactory::new(provider, settings)
}

#[test]
fn test_builtin_host_substituted() {
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    for host in ech_connect::hosts::BUILT_IN_HOSTS {
        assert_eq!(
            factory.resolve_host(RESOLVED, host),
            "198.51.100.7",
            "built-in host {} must handshake against its resolved address",
            host
        );
    }
}

#[test]
fn test_exceptional_domain_substituted() {
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    assert_eq!(
        factory.resolve_host(RESOLVED, "proxy.hath.network"),
        "198.51.100.7"
    );
    assert_eq!(
        factory.resolve_host(RESOLVED, "mirror.hath.network"),
        "198.51.100.7"
    );
}

#[test]
fn test_doh_url_containment_substituted() {
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    // "dns.example.org" is a substring of the DoH URL
    assert_eq!(
        factory.resolve_host(RESOLVED, "dns.example.org"),
        "198.51.100.7"
    );
}

#[test]
fn test_doh_url_change_takes_effect_on_next_call() {
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    assert_eq!(
        factory.resolve_host(RESOLVED, "dns.example.org"),
        "198.51.100.7"
    );

    factory.settings().set_doh_url("https://resolver.invalid/dns-query");
    assert_eq!(
        factory.resolve_host(RESOLVED, "dns.example.org"),
        "dns.example.org"
    );
    assert_eq!(
        factory.resolve_host(RESOLVED, "resolver.invalid"),
        "198.51.100.7"
    );
}

#[test]
fn test_unmatched_host_passes_through_unchanged() {
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    // Not built-in, no exceptional domain, not contained in the DoH URL
    assert_eq!(factory.resolve_host(RESOLVED, "example.com"), "example.com");
}

#[test]
fn test_extra_builtin_host_from_config() {
    let factory = test_factory("https://dns.example.org/dns-query", &["pinned.test"]);
    assert_eq!(factory.resolve_host(RESOLVED, "pinned.test"), "198.51.100.7");
    assert_eq!(
        factory.resolve_host(RESOLVED, "unpinned.test"),
        "unpinned.test"
    );
}

#[test]
fn test_built_in_host_set_membership() {
    assert!(ech_connect::hosts::is_built_in("e-hentai.org"));
    assert!(ech_connect::hosts::is_built_in("ehgt.org"));
    assert!(!ech_connect::hosts::is_built_in("example.com"));
    // Membership is exact, not suffix-based
    assert!(!ech_connect::hosts::is_built_in("sub.e-hentai.org"));
}

#[test]
fn test_cipher_suites_match_wrapped_provider() {
    let provider = Arc::new(EchProvider::with_root_store(RootCertStore::empty()).unwrap());
    let factory = TlsSocketFactory::new(Arc::clone(&provider), Arc::new(Settings::default()));

    let default_ids: Vec<_> = factory
        .default_cipher_suites()
        .iter()
        .map(|s| s.suite())
        .collect();
    let provider_ids: Vec<_> = provider
        .default_cipher_suites()
        .iter()
        .map(|s| s.suite())
        .collect();
    assert_eq!(default_ids, provider_ids);

    let supported_ids: Vec<_> = factory
        .supported_cipher_suites()
        .iter()
        .map(|s| s.suite())
        .collect();
    let all_ids: Vec<_> = rustls::crypto::aws_lc_rs::ALL_CIPHER_SUITES
        .iter()
        .map(|s| s.suite())
        .collect();
    assert_eq!(supported_ids, all_ids);
    assert!(!supported_ids.is_empty());
}

#[tokio::test]
async fn test_upgrade_substitutes_peer_address_for_pinned_host() {
    // End-to-end policy decision against a real connected socket
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let factory = test_factory("https://dns.example.org/dns-query", &[]);

    let peer = stream.peer_addr().unwrap();
    assert_eq!(
        factory.resolve_host(peer.ip(), "mirror.hath.network"),
        "127.0.0.1"
    );
    assert_eq!(
        factory.resolve_host(peer.ip(), "example.com"),
        "example.com"
    );
}

#[tokio::test]
async fn test_upgrade_propagates_handshake_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accept_task = tokio::spawn(async move {
        // Accept and close immediately so the handshake sees EOF
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    let result = factory.upgrade(stream, "example.com", addr.port()).await;
    assert!(matches!(result, Err(EchConnectError::Io(_))));

    let metrics = factory.metrics().snapshot();
    assert_eq!(metrics.connections_attempted, 1);
    assert_eq!(metrics.connections_failed, 1);
    assert_eq!(metrics.connections_established, 0);

    accept_task.await.unwrap();
}

#[tokio::test]
async fn test_upgrade_rejects_invalid_server_name() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    let result = factory.upgrade(stream, "not a hostname", addr.port()).await;
    assert!(matches!(
        result,
        Err(EchConnectError::InvalidServerName { .. })
    ));
}

#[tokio::test]
async fn test_connect_addr_refused_propagates() {
    // Grab a free port, then close the listener so connects are refused
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let factory = test_factory("https://dns.example.org/dns-query", &[]);
    let result = factory
        .connect_addr(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
        .await;
    assert!(matches!(result, Err(EchConnectError::Io(_))));
}
