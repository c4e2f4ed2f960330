use crate::error::{EchConnectError, EchConnectResult};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rustls::pki_types::EchConfigListBytes;
use tracing::debug;

/// Source of ECH configuration lists, consulted once per connection.
///
/// Lookups are best-effort: `None` means the handshake runs without
/// ECH. Implementations must not fail the connection.
#[async_trait]
pub trait EchConfigSource: Send + Sync {
    async fn ech_config_list(&self, host: &str) -> Option<EchConfigListBytes<'static>>;
}

/// Source that never supplies a config list.
pub struct NoEchConfig;

#[async_trait]
impl EchConfigSource for NoEchConfig {
    async fn ech_config_list(&self, _host: &str) -> Option<EchConfigListBytes<'static>> {
        None
    }
}

/// Fixed config list served for every host, e.g. pinned from the
/// config file instead of DNS discovery.
pub struct StaticEchConfig {
    list: EchConfigListBytes<'static>,
}

impl StaticEchConfig {
    pub fn new(list: impl Into<Vec<u8>>) -> Self {
        Self {
            list: EchConfigListBytes::from(list.into()),
        }
    }

    /// Decode a base64 ECH config list as carried in config files.
    pub fn from_base64(encoded: &str) -> EchConnectResult<Self> {
        let bytes = STANDARD.decode(encoded).map_err(|e| {
            EchConnectError::InvalidInput(format!("Invalid ECH config list: {}", e))
        })?;
        if bytes.is_empty() {
            return Err(EchConnectError::InvalidInput(
                "Empty ECH config list".to_string(),
            ));
        }
        Ok(Self::new(bytes))
    }
}

#[async_trait]
impl EchConfigSource for StaticEchConfig {
    async fn ech_config_list(&self, _host: &str) -> Option<EchConfigListBytes<'static>> {
        Some(self.list.clone())
    }
}

/// Colon-separated lowercase hex rendering of a byte buffer.
pub fn hex_dump(buf: &[u8]) -> String {
    buf.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Log the ECH config list carried by a freshly built socket, if any.
///
/// Pure formatting plus `tracing` emission on owned bytes; this can
/// never fail connection setup.
pub(crate) fn log_ech_config_list(list: Option<&EchConfigListBytes<'static>>) {
    if let Some(list) = list {
        debug!(target: "ech_config_list", "ECH config list ({} bytes):", list.len());
        debug!(target: "ech_config_list", "{}", hex_dump(list));
    }
}
