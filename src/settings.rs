use crate::config::NetworkConfig;
use std::collections::HashSet;
use std::sync::RwLock;

/// Runtime-mutable connection settings.
///
/// Constructed once at startup and shared as `Arc<Settings>`; the
/// socket factory reads the DoH URL on every connection attempt, so a
/// change takes effect on the next handshake. Connections already past
/// the policy check keep the name they were given.
pub struct Settings {
    doh_url: RwLock<String>,
    extra_hosts: HashSet<String>,
}

impl Settings {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            doh_url: RwLock::new(config.doh_url.clone()),
            extra_hosts: config.extra_builtin_hosts.iter().cloned().collect(),
        }
    }

    /// Current DoH resolver URL.
    pub fn doh_url(&self) -> String {
        self.doh_url.read().unwrap().clone()
    }

    /// Replace the DoH resolver URL at runtime.
    pub fn set_doh_url(&self, url: impl Into<String>) {
        *self.doh_url.write().unwrap() = url.into();
    }

    /// Whether `host` was pinned through configuration, in addition to
    /// the static built-in set.
    pub fn is_extra_host(&self, host: &str) -> bool {
        self.extra_hosts.contains(host)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(&NetworkConfig::default())
    }
}
