//! HTTP fetch layer: bot-defense-aware page and asset retrieval.
//!
//! Every outbound page request resolves to a [`FetchOutcome`], a tri-state
//! value that keeps "the server said no" ([`FetchOutcome::HttpError`])
//! distinct from "the bot-defense layer prevented any usable response"
//! ([`FetchOutcome::ChallengeBlocked`]). Only the latter justifies escalating
//! to the paid fallback fetch mode, so the distinction is a first-class
//! return value rather than an error downcast.
//!
//! Two fetchers implement the shared [`PageFetcher`] contract:
//! - [`ScrapeClient`] talks to the site directly with a rotating browser
//!   identity and can be rebuilt wholesale between retry attempts;
//! - [`ProxyClient`] routes the same requests through a paid fetch proxy
//!   for the single escalated fallback attempt.

mod error;
mod proxy;

pub use error::FetchError;
pub use proxy::{DEFAULT_PROXY_ENDPOINT, ProxyClient};

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use crate::user_agent::random_browser_identity;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (2 minutes; listing pages and add-on archives
/// are small, but proxy-routed requests add latency).
pub const READ_TIMEOUT_SECS: u64 = 120;

/// Result of one outbound page or asset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Success response with the raw body bytes.
    Success {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: Vec<u8>,
    },
    /// Non-success response that is not a bot-defense challenge.
    HttpError {
        /// The HTTP status code.
        status: u16,
        /// The response body as text, kept for diagnostics.
        body: String,
    },
    /// The bot-defense layer prevented any usable response.
    ChallengeBlocked,
}

impl FetchOutcome {
    /// Returns true for a success response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Markers of a bot-defense interstitial (challenge page or CAPTCHA).
static CHALLENGE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r"(?i)just a moment|checking your browser|cf-browser-verification|cf_chl_|attention required|captcha",
    )
});

/// Classifies a completed HTTP exchange into a [`FetchOutcome`].
///
/// A non-success response whose body carries challenge markers is a block,
/// not an HTTP error; success statuses pass the body through untouched.
pub(crate) fn classify_response(status: u16, body: Vec<u8>) -> FetchOutcome {
    if (200..300).contains(&status) {
        return FetchOutcome::Success { status, body };
    }
    let text = String::from_utf8_lossy(&body).into_owned();
    if CHALLENGE_MARKERS.is_match(&text) {
        FetchOutcome::ChallengeBlocked
    } else {
        FetchOutcome::HttpError { status, body: text }
    }
}

/// Shared contract for the direct and proxy-routed fetch paths.
///
/// Uses `async_trait` so the orchestrator can hand either implementation to
/// the scraping flow as `&dyn PageFetcher` (Rust 2024 native async traits are
/// not object-safe).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short mode name used in logs ("direct" or "proxy").
    fn mode(&self) -> &'static str;

    /// Issues one GET and classifies the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when no usable HTTP exchange happened
    /// (network failure, timeout).
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError>;
}

/// Direct HTTP client presenting a browser identity.
///
/// The client follows redirects, keeps cookies for the session, and is
/// deliberately cheap to throw away: [`ScrapeClient::rebuild`] replaces the
/// underlying client wholesale so a negatively-fingerprinted identity (and
/// its cookies) never carries over into the next retry attempt.
#[derive(Debug)]
pub struct ScrapeClient {
    client: Client,
    identity: &'static str,
}

impl ScrapeClient {
    /// Creates a client with default timeouts and a fresh browser identity.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let identity = random_browser_identity();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .user_agent(identity)
            .default_headers(browser_headers())
            .build()
            .map_err(FetchError::client_build)?;
        Ok(Self { client, identity })
    }

    /// Replaces the underlying client with a freshly built one.
    ///
    /// Sheds cookies and the previous browser identity; nothing of the old
    /// client survives.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the replacement client
    /// cannot be constructed.
    pub fn rebuild(&mut self) -> Result<(), FetchError> {
        *self = Self::new()?;
        Ok(())
    }

    /// The browser identity currently presented by this client.
    #[must_use]
    pub fn identity(&self) -> &'static str {
        self.identity
    }
}

/// Fixed headers sent alongside the browser User-Agent.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

#[async_trait]
impl PageFetcher for ScrapeClient {
    fn mode(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        debug!(url = %url, "fetching page");
        let response = self.client.get(parsed).send().await.map_err(|e| {
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
