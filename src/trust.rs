use crate::error::TrustStoreError;
use rustls::RootCertStore;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Build a root store from the platform's default trust anchors.
///
/// Zero usable anchors is a startup configuration defect, not a
/// per-connection condition.
pub fn native_trust_store() -> Result<RootCertStore, TrustStoreError> {
    let result = rustls_native_certs::load_native_certs();
    for err in &result.errors {
        warn!("Skipping unreadable platform certificate: {}", err);
    }

    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(result.certs);
    debug!(
        "Loaded {} platform trust anchors ({} ignored)",
        added, ignored
    );

    if store.is_empty() {
        return Err(TrustStoreError::Empty);
    }
    Ok(store)
}

/// Append a PEM CA bundle onto an existing root store.
pub fn add_ca_bundle<P: AsRef<Path>>(
    store: &mut RootCertStore,
    path: P,
) -> Result<(), TrustStoreError> {
    let path_str = path.as_ref().display().to_string();
    let pem = std::fs::read(path.as_ref()).map_err(|e| TrustStoreError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let mut reader = BufReader::new(pem.as_slice());
    let certs: Vec<_> = rustls_pemfile::certs(&mut reader)
        .collect::<Result<_, _>>()
        .map_err(|e| TrustStoreError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

    if certs.is_empty() {
        return Err(TrustStoreError::NoCertsInBundle { path: path_str });
    }

    let (added, ignored) = store.add_parsable_certificates(certs);
    debug!(
        "Loaded {} CA certificates from {} ({} ignored)",
        added, ignored, path_str
    );
    Ok(())
}
