use rustls::client::EchStatus;
use rustls::pki_types::EchConfigListBytes;
use rustls::{ProtocolVersion, SupportedCipherSuite};
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

/// TLS-wrapped socket produced by [`TlsSocketFactory`].
///
/// Keeps the ECH config list the handshake was built with so callers
/// and diagnostics can inspect it after the fact.
///
/// [`TlsSocketFactory`]: crate::factory::TlsSocketFactory
pub struct SecureSocket {
    inner: TlsStream<TcpStream>,
    ech_config_list: Option<EchConfigListBytes<'static>>,
    check_dns_for_ech: bool,
}

impl SecureSocket {
    pub(crate) fn new(
        inner: TlsStream<TcpStream>,
        ech_config_list: Option<EchConfigListBytes<'static>>,
        check_dns_for_ech: bool,
    ) -> Self {
        Self {
            inner,
            ech_config_list,
            check_dns_for_ech,
        }
    }

    /// ECH config list used for the handshake, if any.
    pub fn ech_config_list(&self) -> Option<&EchConfigListBytes<'static>> {
        self.ech_config_list.as_ref()
    }

    /// Whether validation of DNS-sourced ECH configuration was
    /// requested for this socket.
    pub fn check_dns_for_ech(&self) -> bool {
        self.check_dns_for_ech
    }

    /// ECH outcome reported by the TLS layer.
    pub fn ech_status(&self) -> EchStatus {
        self.inner.get_ref().1.ech_status()
    }

    pub fn negotiated_cipher_suite(&self) -> Option<SupportedCipherSuite> {
        self.inner.get_ref().1.negotiated_cipher_suite()
    }

    pub fn protocol_version(&self) -> Option<ProtocolVersion> {
        self.inner.get_ref().1.protocol_version()
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.get_ref().0.peer_addr()
    }

    pub fn get_ref(&self) -> &TlsStream<TcpStream> {
        &self.inner
    }

    pub fn into_inner(self) -> TlsStream<TcpStream> {
        self.inner
    }
}

impl AsyncRead for SecureSocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for SecureSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }
}
