use serde::Serialize;
use std::sync::Arc;
/// Connection-level counters
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for socket factory and client activity
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Handshakes attempted
    pub connections_attempted: Arc<AtomicU64>,
    /// Handshakes completed
    pub connections_established: Arc<AtomicU64>,
    /// Handshakes failed
    pub connections_failed: Arc<AtomicU64>,
    /// Upgrades where the resolved address replaced the hostname
    pub host_substitutions: Arc<AtomicU64>,
    /// Sockets produced with an ECH config list
    pub ech_present: Arc<AtomicU64>,
    /// Sockets produced without an ECH config list
    pub ech_absent: Arc<AtomicU64>,
    /// Requests served over a pooled connection
    pub pool_reuses: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            connections_attempted: Arc::new(AtomicU64::new(0)),
            connections_established: Arc::new(AtomicU64::new(0)),
            connections_failed: Arc::new(AtomicU64::new(0)),
            host_substitutions: Arc::new(AtomicU64::new(0)),
            ech_present: Arc::new(AtomicU64::new(0)),
            ech_absent: Arc::new(AtomicU64::new(0)),
            pool_reuses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_attempt(&self) {
        self.connections_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_established(&self, ech_present: bool) {
        self.connections_established.fetch_add(1, Ordering::Relaxed);
        if ech_present {
            self.ech_present.fetch_add(1, Ordering::Relaxed);
        } else {
            self.ech_absent.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.connections_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_substitution(&self) {
        self.host_substitutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pool_reuse(&self) {
        self.pool_reuses.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_attempted: self.connections_attempted.load(Ordering::Relaxed),
            connections_established: self.connections_established.load(Ordering::Relaxed),
            connections_failed: self.connections_failed.load(Ordering::Relaxed),
            host_substitutions: self.host_substitutions.load(Ordering::Relaxed),
            ech_present: self.ech_present.load(Ordering::Relaxed),
            ech_absent: self.ech_absent.load(Ordering::Relaxed),
            pool_reuses: self.pool_reuses.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of [`Metrics`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub connections_attempted: u64,
    pub connections_established: u64,
    pub connections_failed: u64,
    pub host_substitutions: u64,
    pub ech_present: u64,
    pub ech_absent: u64,
    pub pool_reuses: u64,
}
