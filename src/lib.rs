pub mod client;
pub mod config;
pub mod ech;
pub mod error;
pub mod factory;
pub mod hosts;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod settings;
pub mod socket;
pub mod trust;

// Re-export commonly used types for convenience
pub use client::{HttpClient, HttpClientBuilder, HttpResponse};
pub use config::{AppConfig, LoggingConfig, NetworkConfig, TlsConfig};
pub use error::{EchConnectError, EchConnectResult};
pub use factory::TlsSocketFactory;
pub use metrics::Metrics;
pub use provider::EchProvider;
pub use settings::Settings;
pub use socket::SecureSocket;
