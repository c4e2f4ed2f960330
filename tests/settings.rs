use ech_connect::config::NetworkConfig;
use ech_connect::Settings;

#[test]
fn test_settings_from_config() {
    let config = NetworkConfig {
        doh_url: "https://dns.example.org/dns-query".to_string(),
        extra_builtin_hosts: vec!["pinned.test".to_string()],
        request_timeout_secs: 30,
    };
    let settings = Settings::new(&config);
    assert_eq!(settings.doh_url(), "https://dns.example.org/dns-query");
    assert!(settings.is_extra_host("pinned.test"));
    assert!(!settings.is_extra_host("other.test"));
}

#[test]
fn test_set_doh_url_visible_to_readers() {
    let settings = Settings::default();
    settings.set_doh_url("https://resolver.invalid/dns-query");
    assert_eq!(settings.doh_url(), "https://resolver.invalid/dns-query");
}

#[test]
fn test_default_settings_use_default_network_config() {
    let settings = Settings::default();
    assert_eq!(settings.doh_url(), NetworkConfig::default().doh_url);
}

#[test]
fn test_settings_shared_across_threads() {
    use std::sync::Arc;
    use std::thread;

    let settings = Arc::new(Settings::default());
    let writer = {
        let settings = Arc::clone(&settings);
        thread::spawn(move || {
            for i in 0..50 {
                settings.set_doh_url(format!("https://resolver{}.invalid/dns-query", i));
            }
        })
    };

    for _ in 0..50 {
        // Reads must always observe a complete value
        assert!(settings.doh_url().starts_with("https://"));
    }
    writer.join().unwrap();
}
