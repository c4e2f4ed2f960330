/// Error types for ech-connect
use thiserror::Error;

/// Main error type for ech-connect operations
#[derive(Error, Debug)]
pub enum EchConnectError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trust store derivation errors
    #[error("Trust store error: {0}")]
    TrustStore(#[from] TrustStoreError),

    /// TLS configuration errors from the wrapped provider
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Network I/O errors, including handshake failures
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// Server name rejected by the TLS layer
    #[error("Invalid server name: {host}")]
    InvalidServerName { host: String },

    /// Hostname resolution produced no usable address
    #[error("No address resolved for {host}:{port}")]
    NoAddress { host: String, port: u16 },

    /// Protocol-level errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Timeout errors
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trust store derivation errors
///
/// These surface at startup, not per connection; there is no runtime
/// fallback for an unusable trust store.
#[derive(Error, Debug)]
pub enum TrustStoreError {
    /// Platform trust store yielded no usable anchors
    #[error("No usable trust anchors in the platform trust store")]
    Empty,

    /// Extra CA bundle could not be read
    #[error("Failed to read CA bundle {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// Extra CA bundle contained no certificates
    #[error("No certificates found in CA bundle: {path}")]
    NoCertsInBundle { path: String },
}

/// Result type alias for convenience
pub type EchConnectResult<T> = Result<T, EchConnectError>;

/// Helper trait to convert errors to [`EchConnectError`].
///
/// Wraps errors from external operations (parsing, validation) into
/// [`EchConnectError::InvalidInput`] with additional context.
///
/// # Example
///
/// ```rust
/// use ech_connect::error::ToEchConnectError;
///
/// let result: Result<String, &'static str> = Err("invalid format");
/// let converted = result.to_ech_connect_error("URL parsing").unwrap_err();
/// ```
pub trait ToEchConnectError<T> {
    /// Convert the result to an [`EchConnectResult`] with context.
    fn to_ech_connect_error(self, context: &str) -> Result<T, EchConnectError>;
}

impl<T, E: std::fmt::Display> ToEchConnectError<T> for Result<T, E> {
    fn to_ech_connect_error(self, context: &str) -> Result<T, EchConnectError> {
        self.map_err(|e| EchConnectError::InvalidInput(format!("{}: {}", context, e)))
    }
}
