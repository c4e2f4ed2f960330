use std::collections::HashSet;
use std::sync::OnceLock;

/// Domain whose hosts always handshake against their resolved address.
pub const EXCEPTIONAL_DOMAIN: &str = "hath.network";

/// Hosts of the gallery mirror network that are resolved through the
/// custom resolver and therefore handshake against a pinned address.
pub const BUILT_IN_HOSTS: &[&str] = &[
    "e-hentai.org",
    "api.e-hentai.org",
    "forums.e-hentai.org",
    "repo.e-hentai.org",
    "upld.e-hentai.org",
    "exhentai.org",
    "s.exhentai.org",
    "ehgt.org",
];

fn host_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| BUILT_IN_HOSTS.iter().copied().collect())
}

/// Whether `host` is a member of the static built-in host set.
pub fn is_built_in(host: &str) -> bool {
    host_set().contains(host)
}
