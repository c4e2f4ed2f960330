use crate::ech::{self, EchConfigSource, NoEchConfig};
use crate::error::{EchConnectError, EchConnectResult};
use crate::hosts;
use crate::metrics::Metrics;
use crate::provider::EchProvider;
use crate::settings::Settings;
use crate::socket::SecureSocket;
use rustls::pki_types::ServerName;
use rustls::SupportedCipherSuite;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Drop-in TLS socket factory delegating to a shared [`EchProvider`].
///
/// Identical in cryptographic behavior to the wrapped provider, with
/// two additions: pinned hosts handshake against their already-resolved
/// address on the upgrade path, and every produced socket gets ECH
/// diagnostics logged. All network and TLS errors propagate unchanged.
///
/// The factory holds no per-connection state; concurrent use from
/// connection-pool tasks needs no synchronization.
pub struct TlsSocketFactory {
    provider: Arc<EchProvider>,
    settings: Arc<Settings>,
    ech_source: Arc<dyn EchConfigSource>,
    metrics: Arc<Metrics>,
}

impl TlsSocketFactory {
    pub fn new(provider: Arc<EchProvider>, settings: Arc<Settings>) -> Self {
        Self {
            provider,
            settings,
            ech_source: Arc::new(NoEchConfig),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Replace the ECH config source consulted before each handshake.
    pub fn with_ech_source(mut self, source: Arc<dyn EchConfigSource>) -> Self {
        self.ech_source = source;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn provider(&self) -> &Arc<EchProvider> {
        &self.provider
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Cipher suites the wrapped provider enables by default.
    pub fn default_cipher_suites(&self) -> &[SupportedCipherSuite] {
        self.provider.default_cipher_suites()
    }

    /// Every cipher suite the wrapped provider supports.
    pub fn supported_cipher_suites(&self) -> &[SupportedCipherSuite] {
        self.provider.supported_cipher_suites()
    }

    /// TLS-wrap an already-connected plain socket.
    ///
    /// The only entry point subject to the name resolution policy:
    /// pinned hosts handshake against the socket's resolved peer
    /// address, everything else keeps normal SNI behavior.
    pub async fn upgrade(
        &self,
        stream: TcpStream,
        host: &str,
        port: u16,
    ) -> EchConnectResult<SecureSocket> {
        let peer = stream.peer_addr()?;
        let server_name = self.resolve_host(peer.ip(), host);
        if server_name != host {
            self.metrics.record_substitution();
            debug!(
                "Upgrading socket to {}:{} as {} (pinned resolution)",
                host, port, server_name
            );
        }
        self.handshake(stream, &server_name, host).await
    }

    /// Connect by hostname and wrap in TLS.
    pub async fn connect(&self, host: &str, port: u16) -> EchConnectResult<SecureSocket> {
        let stream = TcpStream::connect((host, port)).await?;
        self.handshake(stream, host, host).await
    }

    /// Connect by hostname with the local side bound first.
    pub async fn connect_from(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> EchConnectResult<SecureSocket> {
        let stream = Self::connect_bound(host, port, local_addr, local_port).await?;
        self.handshake(stream, host, host).await
    }

    /// Connect by address; rustls sends no SNI for IP server names.
    pub async fn connect_addr(&self, addr: IpAddr, port: u16) -> EchConnectResult<SecureSocket> {
        let stream = TcpStream::connect(SocketAddr::new(addr, port)).await?;
        let host = addr.to_string();
        self.handshake(stream, &host, &host).await
    }

    /// Connect by address with the local side bound first.
    pub async fn connect_addr_from(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> EchConnectResult<SecureSocket> {
        let host = addr.to_string();
        let stream = Self::connect_bound(&host, port, local_addr, local_port).await?;
        self.handshake(stream, &host, &host).await
    }

    /// Decide the name handed to the underlying provider for a socket
    /// upgrade.
    ///
    /// The already-resolved address replaces the hostname iff the host
    /// is in the built-in set, contains the exceptional domain, or is
    /// contained in the current DoH URL setting. The DoH URL is read
    /// live on every call; the containment check is deliberately plain
    /// substring matching.
    pub fn resolve_host(&self, resolved: IpAddr, host: &str) -> String {
        let pinned = hosts::is_built_in(host)
            || self.settings.is_extra_host(host)
            || host.contains(hosts::EXCEPTIONAL_DOMAIN)
            || self.settings.doh_url().contains(host);
        if pinned {
            resolved.to_string()
        } else {
            host.to_string()
        }
    }

    async fn connect_bound(
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> EchConnectResult<TcpStream> {
        let mut last_err = None;
        for remote in lookup_host((host, port)).await? {
            if remote.is_ipv4() != local_addr.is_ipv4() {
                continue;
            }
            let socket = if remote.is_ipv4() {
                TcpSocket::new_v4()?
            } else {
                TcpSocket::new_v6()?
            };
            socket.bind(SocketAddr::new(local_addr, local_port))?;
            match socket.connect(remote).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!("Connect to {} from {} failed: {}", remote, local_addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err
            .map(EchConnectError::Io)
            .unwrap_or_else(|| EchConnectError::NoAddress {
                host: host.to_string(),
                port,
            }))
    }

    /// Handshake over an established stream and apply ECH diagnostics.
    ///
    /// `server_name` is what the TLS layer sees; `ech_host` is the
    /// original hostname used for the ECH config lookup.
    async fn handshake(
        &self,
        stream: TcpStream,
        server_name: &str,
        ech_host: &str,
    ) -> EchConnectResult<SecureSocket> {
        self.metrics.record_attempt();

        let name = ServerName::try_from(server_name.to_string()).map_err(|_| {
            EchConnectError::InvalidServerName {
                host: server_name.to_string(),
            }
        })?;

        let ech_config_list = self.ech_source.ech_config_list(ech_host).await;
        let config = self.provider.client_config(ech_config_list.as_ref());
        let connector = TlsConnector::from(config);

        let tls = match connector.connect(name, stream).await {
            Ok(tls) => tls,
            Err(e) => {
                self.metrics.record_failure();
                return Err(e.into());
            }
        };

        // DNS check for ECH is requested on every produced socket.
        let socket = SecureSocket::new(tls, ech_config_list, true);
        self.metrics.record_established(socket.ech_config_list().is_some());

        ech::log_ech_config_list(socket.ech_config_list());
        debug!(
            "TLS established with {} (ECH status: {:?})",
            server_name,
            socket.ech_status()
        );
        Ok(socket)
    }
}
