use crate::error::EchConnectResult;
use crate::trust;
use rustls::client::{EchConfig, EchMode};
use rustls::crypto::aws_lc_rs;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::EchConfigListBytes;
use rustls::{ClientConfig, RootCertStore, SupportedCipherSuite};
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Underlying TLS provider wrapped by the socket factory.
///
/// Created once and reused for every socket; holds no per-connection
/// state, so unsynchronized concurrent use is safe.
pub struct EchProvider {
    crypto: Arc<CryptoProvider>,
    roots: Arc<RootCertStore>,
    standard_config: Arc<ClientConfig>,
}

impl EchProvider {
    /// Build a provider trusting the platform's default anchors.
    pub fn from_native_roots() -> EchConnectResult<Self> {
        Self::with_root_store(trust::native_trust_store()?)
    }

    /// Build a provider over an explicit root store.
    pub fn with_root_store(roots: RootCertStore) -> EchConnectResult<Self> {
        let crypto = Arc::new(aws_lc_rs::default_provider());
        let roots = Arc::new(roots);

        let standard_config = Arc::new(
            ClientConfig::builder_with_provider(Arc::clone(&crypto))
                .with_safe_default_protocol_versions()?
                .with_root_certificates(Arc::clone(&roots))
                .with_no_client_auth(),
        );

        Ok(Self {
            crypto,
            roots,
            standard_config,
        })
    }

    /// Client config for one connection.
    ///
    /// With a config list present the handshake runs ECH-enabled and
    /// validates against that list (TLS 1.3 only); an unparseable list
    /// falls back to the shared standard config with a warning rather
    /// than failing the connection.
    pub fn client_config(
        &self,
        ech_config_list: Option<&EchConfigListBytes<'static>>,
    ) -> Arc<ClientConfig> {
        let Some(list) = ech_config_list else {
            return Arc::clone(&self.standard_config);
        };

        let ech_config = match EchConfig::new(list.clone(), aws_lc_rs::hpke::ALL_SUPPORTED_SUITES)
        {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse ECH config list, using standard TLS: {}", e);
                return Arc::clone(&self.standard_config);
            }
        };

        match ClientConfig::builder_with_provider(Arc::clone(&self.crypto))
            .with_ech(EchMode::Enable(ech_config))
        {
            Ok(builder) => Arc::new(
                builder
                    .with_root_certificates(Arc::clone(&self.roots))
                    .with_no_client_auth(),
            ),
            Err(e) => {
                warn!("ECH-enabled TLS config rejected, using standard TLS: {}", e);
                Arc::clone(&self.standard_config)
            }
        }
    }

    /// Cipher suites this provider instance enables.
    pub fn default_cipher_suites(&self) -> &[SupportedCipherSuite] {
        &self.crypto.cipher_suites
    }

    /// Every cipher suite the wrapped crypto implementation supports.
    pub fn supported_cipher_suites(&self) -> &[SupportedCipherSuite] {
        aws_lc_rs::ALL_CIPHER_SUITES
    }

    pub fn crypto(&self) -> &Arc<CryptoProvider> {
        &self.crypto
    }

    pub fn root_store(&self) -> &Arc<RootCertStore> {
        &self.roots
    }
}

/// Process-wide provider, created on first use and alive for the
/// process lifetime.
///
/// Panics if the platform trust store yields no usable anchors.
pub fn default_provider() -> &'static Arc<EchProvider> {
    static PROVIDER: OnceLock<Arc<EchProvider>> = OnceLock::new();
    PROVIDER.get_or_init(|| {
        Arc::new(
            EchProvider::from_native_roots().expect("Failed to load platform trust anchors"),
        )
    })
}
