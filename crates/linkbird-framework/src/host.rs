//! Host normalization for handler lookup.

const WWW_PREFIX: &str = "www.";

/// Returns the registry keys to try for `host`, in order.
///
/// An exact registration always wins: `www.example.com` is looked up as
/// itself first, and only then as `example.com`. The two handler lists are
/// tried one after the other, never merged.
pub fn lookup_keys(host: &str) -> Vec<&str> {
    match host.strip_prefix(WWW_PREFIX) {
        Some(bare) => vec![host, bare],
        None => vec![host],
    }
}
