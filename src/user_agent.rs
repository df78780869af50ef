//! Browser identities presented by the scrape client, and the tool identity
//! used for structured-API traffic.
//!
//! The listing site sits behind bot defense that fingerprints clients, so
//! scrape traffic presents a mainstream browser identity picked at random on
//! every client (re)build. API traffic identifies the tool honestly.

use rand::Rng;

/// Browser identities rotated across scrape client rebuilds.
const BROWSER_IDENTITIES: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:132.0) Gecko/20100101 Firefox/132.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
];

/// Picks a fresh browser identity for a scrape client build.
#[must_use]
pub(crate) fn random_browser_identity() -> &'static str {
    let mut rng = rand::thread_rng();
    BROWSER_IDENTITIES[rng.gen_range(0..BROWSER_IDENTITIES.len())]
}

/// Default User-Agent for structured-API requests (identifies the tool).
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("cf-mirror/{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_identity_comes_from_pool() {
        for _ in 0..50 {
            let identity = random_browser_identity();
            assert!(BROWSER_IDENTITIES.contains(&identity));
            assert!(identity.starts_with("Mozilla/5.0"));
        }
    }

    #[test]
    fn test_api_user_agent_carries_crate_version() {
        let ua = default_api_user_agent();
        assert!(ua.starts_with("cf-mirror/"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }
}
