use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// DoH resolver endpoint. Hostnames contained in this URL handshake
    /// against their resolved address instead of their name.
    #[serde(default = "default_doh_url")]
    pub doh_url: String,
    /// Hosts pinned in addition to the built-in set
    #[serde(default)]
    pub extra_builtin_hosts: Vec<String>,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TlsConfig {
    /// Extra PEM CA bundle appended to the platform trust anchors
    #[serde(default)]
    pub extra_ca_file: Option<String>,
    /// Base64 ECH config list pinned for every host instead of DNS
    /// discovery
    #[serde(default)]
    pub ech_config_list: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path; console-only when unset
    #[serde(default)]
    pub file: Option<String>,
    /// Rotate the log file daily
    #[serde(default)]
    pub rotation: bool,
    /// Emit JSON to the log file
    #[serde(default)]
    pub json: bool,
}

fn default_doh_url() -> String {
    "https://1.1.1.1/dns-query".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            doh_url: default_doh_url(),
            extra_builtin_hosts: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            rotation: false,
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config file, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration before startup
    pub fn validate(&self) -> Result<()> {
        if !self.network.doh_url.is_empty() && !self.network.doh_url.starts_with("https://") {
            anyhow::bail!(
                "network.doh_url must be an https:// URL, got: {}",
                self.network.doh_url
            );
        }
        if self.network.request_timeout_secs == 0 {
            anyhow::bail!("network.request_timeout_secs must be greater than zero");
        }
        for host in &self.network.extra_builtin_hosts {
            if host.trim().is_empty() {
                anyhow::bail!("network.extra_builtin_hosts contains an empty hostname");
            }
        }
        if let Some(encoded) = &self.tls.ech_config_list {
            if encoded.trim().is_empty() {
                anyhow::bail!("tls.ech_config_list is set but empty");
            }
        }
        Ok(())
    }

    /// Whole-request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }
}
