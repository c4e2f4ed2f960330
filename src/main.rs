use anyhow::{Context, Result};
use ech_connect::ech::StaticEchConfig;
use ech_connect::{
    logging, trust, AppConfig, EchProvider, HttpClientBuilder, Settings, TlsSocketFactory,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider before any TLS operations
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install default crypto provider: {:?}", e))?;

    // Load config first (before logging init) to get logging config
    let config = AppConfig::load_or_default("config.toml");

    config
        .validate()
        .context("Configuration validation failed")?;

    let _guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging system")?;

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://e-hentai.org/".to_string());

    // Derive the trust store: platform anchors plus any configured
    // extra CA bundle
    let mut roots =
        trust::native_trust_store().context("Failed to load platform trust anchors")?;
    if let Some(ca_file) = &config.tls.extra_ca_file {
        trust::add_ca_bundle(&mut roots, ca_file)
            .with_context(|| format!("Failed to load extra CA bundle: {}", ca_file))?;
    }

    let provider = Arc::new(
        EchProvider::with_root_store(roots).context("Failed to build TLS provider")?,
    );
    let settings = Arc::new(Settings::new(&config.network));

    let mut factory = TlsSocketFactory::new(provider, settings);
    if let Some(encoded) = &config.tls.ech_config_list {
        let source =
            StaticEchConfig::from_base64(encoded).context("Invalid tls.ech_config_list")?;
        factory = factory.with_ech_source(Arc::new(source));
    }
    let factory = Arc::new(factory);

    let http_client = HttpClientBuilder::new()
        .request_timeout(config.request_timeout())
        .install(Arc::clone(&factory))
        .build()
        .context("Failed to build HTTP client")?;

    info!("Fetching {}", url);
    let response = http_client
        .get(&url)
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let summary = serde_json::json!({
        "url": url,
        "status": response.status.as_u16(),
        "body_bytes": response.body.len(),
        "metrics": factory.metrics().snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
