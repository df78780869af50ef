//! Proxy-routed fetching for the escalated fallback attempt.
//!
//! When the plain attempt budget is exhausted and the site's bot defense is
//! the reason, the orchestrator pays for exactly one pass through a fetch
//! proxy: the target URL is wrapped as a query parameter to the proxy
//! endpoint, which performs the challenge solving on its side and relays the
//! page. Same classification as the direct path, just routed differently.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{
    CONNECT_TIMEOUT_SECS, FetchError, FetchOutcome, PageFetcher, READ_TIMEOUT_SECS,
    classify_response,
};

/// Default fetch-proxy endpoint.
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://app.scrapingbee.com/api/v1";

/// Fixed country routing for proxy-relayed requests.
const PROXY_COUNTRY_CODE: &str = "us";

/// Fetcher that relays every request through the paid fetch proxy.
pub struct ProxyClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ProxyClient {
    /// Creates a proxy client against the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_endpoint(api_key, DEFAULT_PROXY_ENDPOINT)
    }

    /// Creates a proxy client against a custom endpoint (tests).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(FetchError::client_build)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

// Manual Debug: the API key must never end up in logs.
impl fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PageFetcher for ProxyClient {
    fn mode(&self) -> &'static str {
        "proxy"
    }

    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        debug!(url = %url, "fetching page via proxy");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("country_code", PROXY_COUNTRY_CODE),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::timeout(url)
                } else {
                    FetchError::network(url, e)
                }
            })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        Ok(classify_response(status, body.to_vec()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_proxy_wraps_target_url_as_query_param() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1"))
            .and(query_param("api_key", "secret"))
            .and(query_param("url", "https://example.com/addons/foo"))
            .and(query_param("country_code", "us"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<html>relayed</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            ProxyClient::with_endpoint("secret", format!("{}/api/v1", mock_server.uri())).unwrap();
        let outcome = client.fetch("https://example.com/addons/foo").await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                status: 200,
                body: b"<html>relayed</html>".to_vec()
            }
        );
    }

    #[tokio::test]
    async fn test_proxy_failure_still_classifies_challenge() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1"))
            .respond_with(
                ResponseTemplate::new(503).set_body_bytes(b"Just a moment...".to_vec()),
            )
            .mount(&mock_server)
            .await;

        let client =
            ProxyClient::with_endpoint("secret", format!("{}/api/v1", mock_server.uri())).unwrap();
        let outcome = client.fetch("https://example.com/addons/foo").await.unwrap();
        assert_eq!(outcome, FetchOutcome::ChallengeBlocked);
    }

    #[test]
    fn test_debug_does_not_leak_api_key() {
        let client = ProxyClient::with_endpoint("secret-key", "https://proxy.example").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret-key"), "key leaked: {rendered}");
    }
}
