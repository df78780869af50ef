//! Structured-API client for the identifier-based acquisition path.
//!
//! When the add-on's numeric id is known, the files endpoint gives direct
//! download URLs without touching the bot-defended HTML pages: one
//! authenticated GET per game-version track, filtered by the track's
//! version-type code, taking the first (most recent) file of each result.
//! The output is the same [`DownloadMapping`] shape the scraping path
//! produces, just with [`AssetLocation::Direct`] entries.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::asset::{AssetLocation, AssetRecord, DownloadMapping, strip_archive_extension};
use crate::fetch::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::track::GameVersionTrack;
use crate::user_agent::default_api_user_agent;

/// Default structured-API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.curseforge.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Errors from the structured-API path.
///
/// Any of these makes the whole path report failure; the orchestrator logs
/// and falls back to scraping rather than aborting the run.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error issuing the request.
    #[error("network error querying {url}: {source}")]
    Network {
        /// The endpoint URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("API returned HTTP {status} for {url}: {body}")]
    Http {
        /// The endpoint URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The response body, kept for diagnostics.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode API response from {url}: {source}")]
    Decode {
        /// The endpoint URL.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build API client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    fn http(url: impl Into<String>, status: u16, body: String) -> Self {
        Self::Http {
            url: url.into(),
            status,
            body,
        }
    }

    fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}

/// Files-list response envelope.
#[derive(Debug, Deserialize)]
struct FilesResponse {
    data: Vec<ApiFile>,
}

/// One file record from the files endpoint. Only the fields this tool needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFile {
    file_name: String,
    /// Absent for files the API will not serve directly.
    download_url: Option<String>,
}

/// Client for the per-track files endpoint.
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Creates a client against the default API base.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_base_url(api_key, DEFAULT_API_BASE)
    }

    /// Creates a client against a custom base URL (tests).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(default_api_user_agent())
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetches the latest file per track for the given add-on id.
    ///
    /// Tracks with no files are absent from the result; files without a
    /// direct download URL are skipped with a warning. An empty mapping is
    /// not an error here — the caller decides whether to fall back.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure for any
    /// track query.
    pub async fn latest_files(&self, addon_id: u32) -> Result<DownloadMapping, ApiError> {
        let mut mapping = DownloadMapping::new();
        for track in GameVersionTrack::ALL {
            let url = format!("{}/v1/mods/{addon_id}/files", self.base_url);
            let response = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("gameVersionTypeId", track.version_type_id().to_string())])
                .send()
                .await
                .map_err(|e| ApiError::network(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::http(&url, status.as_u16(), body));
            }

            let files: FilesResponse = response
                .json()
                .await
                .map_err(|e| ApiError::decode(&url, e))?;
            let Some(file) = files.data.into_iter().next() else {
                debug!(track = %track, "no files listed for track");
                continue;
            };
            let Some(download_url) = file.download_url else {
                warn!(
                    track = %track,
                    file = %file.file_name,
                    "file record has no direct download URL, skipping track"
                );
                continue;
            };
            debug!(track = %track, file = %file.file_name, "latest file found");
            mapping.insert(
                track,
                AssetRecord {
                    location: AssetLocation::Direct(download_url),
                    file_name: strip_archive_extension(&file.file_name),
                },
            );
        }
        Ok(mapping)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn file_record(name: &str, url: Option<&str>) -> serde_json::Value {
        match url {
            Some(url) => json!({"fileName": name, "downloadUrl": url}),
            None => json!({"fileName": name, "downloadUrl": null}),
        }
    }

    #[tokio::test]
    async fn test_latest_files_queries_every_track_with_key() {
        let mock_server = MockServer::start().await;
        for track in GameVersionTrack::ALL {
            Mock::given(method("GET"))
                .and(path("/v1/mods/42/files"))
                .and(header("x-api-key", "k"))
                .and(query_param(
                    "gameVersionTypeId",
                    track.version_type_id().to_string(),
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": [file_record("Addon-1.0.zip", Some("https://cdn.example/1.zip"))]
                })))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let client = ApiClient::with_base_url("k", mock_server.uri()).unwrap();
        let mapping = client.latest_files(42).await.unwrap();
        assert_eq!(mapping.len(), 4);
        for record in mapping.values() {
            assert_eq!(record.file_name, "Addon-1.0");
            assert_eq!(
                record.location,
                AssetLocation::Direct("https://cdn.example/1.zip".to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_latest_files_takes_first_element() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/7/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    file_record("Addon-2.0.zip", Some("https://cdn.example/new.zip")),
                    file_record("Addon-1.0.zip", Some("https://cdn.example/old.zip")),
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::with_base_url("k", mock_server.uri()).unwrap();
        let mapping = client.latest_files(7).await.unwrap();
        let record = mapping.get(&GameVersionTrack::Retail).unwrap();
        assert_eq!(record.file_name, "Addon-2.0");
    }

    #[tokio::test]
    async fn test_latest_files_empty_lists_yield_empty_mapping() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/42/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&mock_server)
            .await;

        let client = ApiClient::with_base_url("k", mock_server.uri()).unwrap();
        let mapping = client.latest_files(42).await.unwrap();
        assert!(mapping.is_empty());
    }

    #[tokio::test]
    async fn test_latest_files_null_download_url_skips_track() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/42/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [file_record("Addon-1.0.zip", None)]
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::with_base_url("k", mock_server.uri()).unwrap();
        let mapping = client.latest_files(42).await.unwrap();
        assert!(mapping.is_empty());
    }

    #[tokio::test]
    async fn test_latest_files_http_error_propagates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/42/files"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::with_base_url("k", mock_server.uri()).unwrap();
        let result = client.latest_files(42).await;
        match result {
            Err(ApiError::Http { status, body, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected Http error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_latest_files_decode_error_propagates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/42/files"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::with_base_url("k", mock_server.uri()).unwrap();
        let result = client.latest_files(42).await;
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
