//! Acquisition orchestrator: drives one end-to-end mirror run.
//!
//! The run is a small state machine:
//!
//! ```text
//! TryStructuredApi -> ScrapeAttempt(n) -> ScrapeFallbackAttempt
//!                                  \-> ResolveAssets -> DownloadAll -> Done
//!                                                              \-> Fatal
//! ```
//!
//! The API path runs first when an add-on id is configured; any failure there
//! falls through to the scraping loop. The loop makes a bounded number of
//! plain attempts (rebuilding the HTTP client between attempts, linear
//! backoff), then at most one proxy-routed fallback attempt. Everything is
//! sequential by design: request volume is tiny and ordered log output is
//! worth more than latency.

mod error;
mod retry;

pub use error::MirrorError;
pub use retry::{DEFAULT_PLAIN_ATTEMPTS, RetrySchedule};

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::asset::{AssetLocation, AssetRecord, DownloadMapping, ResolvedAsset};
use crate::config::{Endpoints, MirrorConfig};
use crate::fetch::{FetchOutcome, PageFetcher, ProxyClient, ScrapeClient};
use crate::listing::{parse_file_name, parse_listing};
use crate::locator::resolve_locator;
use crate::track::{GameVersionTrack, archive_file_name};

/// Counters from a completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorStats {
    /// Tracks with a resolved download mapping entry.
    pub tracks_found: usize,
    /// Files written to disk.
    pub files_written: usize,
    /// Per-track downloads that failed (logged, not fatal).
    pub failed_downloads: usize,
}

/// Result of one scrape attempt (listing fetch plus detail fetches).
#[derive(Debug, Default)]
struct ScrapeAttempt {
    mapping: DownloadMapping,
    /// Whether any request in this attempt hit the bot-defense layer.
    challenged: bool,
}

impl ScrapeAttempt {
    fn blocked() -> Self {
        Self {
            mapping: DownloadMapping::new(),
            challenged: true,
        }
    }
}

/// Orchestrates one end-to-end mirror run for a single add-on.
///
/// Owns the direct [`ScrapeClient`] and replaces it wholesale between retry
/// attempts; the proxy client exists only for the single fallback attempt.
pub struct Mirror {
    config: MirrorConfig,
    endpoints: Endpoints,
    schedule: RetrySchedule,
    client: ScrapeClient,
}

impl Mirror {
    /// Creates an orchestrator against the live endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Fetch`] when the HTTP client cannot be built.
    pub fn new(config: MirrorConfig) -> Result<Self, MirrorError> {
        Self::with_endpoints(config, Endpoints::default())
    }

    /// Creates an orchestrator against custom endpoints (tests).
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Fetch`] when the HTTP client cannot be built.
    pub fn with_endpoints(config: MirrorConfig, endpoints: Endpoints) -> Result<Self, MirrorError> {
        let schedule = RetrySchedule::with_plain_attempts(config.plain_attempts);
        Ok(Self {
            client: ScrapeClient::new()?,
            config,
            endpoints,
            schedule,
        })
    }

    /// Overrides the retry pacing (tests use a zero-delay schedule).
    #[must_use]
    pub fn with_schedule(mut self, schedule: RetrySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Runs the full acquisition pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NoDownloadsFound`] when neither path produced a
    /// mapping, [`MirrorError::Locator`] when a scraped locator does not
    /// match the shard rule, and [`MirrorError::Io`]/[`MirrorError::Fetch`]
    /// on local-write and client-construction failures.
    pub async fn run(&mut self) -> Result<MirrorStats, MirrorError> {
        info!(addon = %self.config.addon_name, "pulling files for add-on");

        if let Some(stats) = self.try_api_path().await? {
            return Ok(stats);
        }

        let mapping = self.acquire_mapping().await?;
        info!(
            tracks = mapping.len(),
            "mapping finalized, downloading files from CDN"
        );
        let resolved = self.resolve_assets(mapping)?;
        self.download_all(resolved).await
    }

    /// The identifier-based path. `Ok(Some(stats))` means the run is done;
    /// `Ok(None)` means fall through to scraping.
    async fn try_api_path(&self) -> Result<Option<MirrorStats>, MirrorError> {
        let (Some(addon_id), Some(api_key)) = (self.config.addon_id, self.config.api_key.as_deref())
        else {
            debug!("no add-on id configured, using the scraping path");
            return Ok(None);
        };

        info!(addon_id, "trying the structured API path");
        let api = match ApiClient::with_base_url(api_key, &self.endpoints.api_base) {
            Ok(api) => api,
            Err(e) => {
                warn!(error = %e, "API client unavailable, falling back to scraping");
                return Ok(None);
            }
        };
        let mapping = match api.latest_files(addon_id).await {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(error = %e, "API query failed, falling back to scraping");
                return Ok(None);
            }
        };
        if mapping.is_empty() {
            warn!("API listed no files for any track, falling back to scraping");
            return Ok(None);
        }

        let resolved = self.resolve_assets(mapping)?;
        let stats = self.download_all(resolved).await?;
        if stats.failed_downloads == 0 && stats.files_written > 0 {
            Ok(Some(stats))
        } else {
            warn!(
                failed = stats.failed_downloads,
                "API path downloads incomplete, falling back to scraping"
            );
            Ok(None)
        }
    }

    /// The scraping loop: plain attempts with linear backoff and client
    /// rebuilds, then at most one proxy-routed fallback attempt.
    async fn acquire_mapping(&mut self) -> Result<DownloadMapping, MirrorError> {
        let plain_attempts = self.schedule.plain_attempts();
        let mut saw_challenge = false;

        for attempt in 0..plain_attempts {
            let outcome = self.scrape_attempt(&self.client).await;
            saw_challenge |= outcome.challenged;
            if !outcome.mapping.is_empty() {
                info!(
                    attempt,
                    tracks = outcome.mapping.len(),
                    "found downloads in listing"
                );
                return Ok(outcome.mapping);
            }
            warn!(attempt, "no download mapping found, retrying");
            let delay = self.schedule.delay_for(attempt);
            if !delay.is_zero() {
                debug!(delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), "backing off");
                sleep(delay).await;
            }
            // Shed the (possibly negatively fingerprinted) client before the
            // next attempt.
            self.client.rebuild()?;
        }

        if !saw_challenge {
            // The site answered every attempt; paying for proxy traffic
            // would not change anything.
            return Err(MirrorError::no_downloads_found(
                &self.config.addon_name,
                plain_attempts,
            ));
        }

        let Some(proxy_key) = self.config.proxy_api_key.as_deref() else {
            warn!("bot defense blocked scraping and no proxy key is configured; skipping fallback");
            return Err(MirrorError::no_downloads_found(
                &self.config.addon_name,
                plain_attempts,
            ));
        };

        info!("escalating to the proxy fallback fetch");
        let proxy = ProxyClient::with_endpoint(proxy_key, &self.endpoints.proxy_base)?;
        let outcome = self.scrape_attempt(&proxy).await;
        if outcome.mapping.is_empty() {
            return Err(MirrorError::no_downloads_found(
                &self.config.addon_name,
                plain_attempts + 1,
            ));
        }
        info!(
            tracks = outcome.mapping.len(),
            "found downloads via proxy fallback"
        );
        Ok(outcome.mapping)
    }

    /// One full scrape pass: listing page, then one detail page per entry.
    async fn scrape_attempt(&self, fetcher: &dyn PageFetcher) -> ScrapeAttempt {
        let addon = &self.config.addon_name;
        let listing_url = self.endpoints.addon_url(addon);

        let outcome = match fetcher.fetch(&listing_url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(mode = fetcher.mode(), url = %listing_url, error = %e, "listing fetch failed");
                return ScrapeAttempt::default();
            }
        };
        let html = match outcome {
            FetchOutcome::Success { body, .. } => String::from_utf8_lossy(&body).into_owned(),
            FetchOutcome::ChallengeBlocked => {
                warn!(mode = fetcher.mode(), url = %listing_url, "listing fetch blocked by bot defense");
                return ScrapeAttempt::blocked();
            }
            FetchOutcome::HttpError { status, body } => {
                error!(
                    addon = %addon,
                    url = %listing_url,
                    status,
                    body = %body,
                    "add-on page returned an error"
                );
                return ScrapeAttempt::default();
            }
        };

        let entries = parse_listing(&html, &self.endpoints.files_prefix(addon));
        let mut attempt = ScrapeAttempt::default();
        for entry in entries {
            let detail_url = self.endpoints.file_detail_url(addon, &entry.locator);
            let outcome = match fetcher.fetch(&detail_url).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(track = %entry.track, url = %detail_url, error = %e, "file detail fetch failed");
                    continue;
                }
            };
            match outcome {
                FetchOutcome::Success { body, .. } => {
                    let html = String::from_utf8_lossy(&body);
                    if let Some(file_name) = parse_file_name(&html) {
                        attempt.mapping.insert(
                            entry.track,
                            AssetRecord {
                                location: AssetLocation::Locator(entry.locator),
                                file_name,
                            },
                        );
                    } else {
                        warn!(track = %entry.track, url = %detail_url, "file detail page has no file name");
                    }
                }
                FetchOutcome::ChallengeBlocked => {
                    warn!(track = %entry.track, url = %detail_url, "file detail fetch blocked by bot defense");
                    attempt.challenged = true;
                }
                FetchOutcome::HttpError { status, body } => {
                    error!(
                        addon = %addon,
                        track = %entry.track,
                        url = %detail_url,
                        status,
                        body = %body,
                        "file detail page returned an error"
                    );
                }
            }
        }
        attempt
    }

    /// Resolves every mapping entry to a final download URL. A locator that
    /// does not match the shard rule aborts the run.
    fn resolve_assets(
        &self,
        mapping: DownloadMapping,
    ) -> Result<Vec<(GameVersionTrack, ResolvedAsset)>, MirrorError> {
        let mut resolved = Vec::with_capacity(mapping.len());
        for (track, record) in mapping {
            let url = match record.location {
                AssetLocation::Locator(locator) => {
                    let (shard_a, shard_b) = resolve_locator(&locator)?;
                    self.endpoints
                        .cdn_asset_url(&shard_a, &shard_b, &record.file_name)
                }
                AssetLocation::Direct(url) => url,
            };
            resolved.push((
                track,
                ResolvedAsset {
                    url,
                    file_name: record.file_name,
                },
            ));
        }
        Ok(resolved)
    }

    /// Downloads every resolved asset sequentially. A failed track is logged
    /// and skipped; only local write failures abort.
    async fn download_all(
        &self,
        assets: Vec<(GameVersionTrack, ResolvedAsset)>,
    ) -> Result<MirrorStats, MirrorError> {
        let mut stats = MirrorStats {
            tracks_found: assets.len(),
            ..MirrorStats::default()
        };
        for (track, asset) in assets {
            match self.client.fetch(&asset.url).await {
                Ok(FetchOutcome::Success { body, .. }) => {
                    let file_name = archive_file_name(&asset.file_name, track);
                    let path = self.config.output_dir.join(&file_name);
                    tokio::fs::write(&path, &body)
                        .await
                        .map_err(|e| MirrorError::io(&path, e))?;
                    info!(
                        track = %track,
                        path = %path.display(),
                        bytes = body.len(),
                        "file written"
                    );
                    stats.files_written += 1;
                }
                Ok(FetchOutcome::HttpError { status, body }) => {
                    error!(
                        addon = %self.config.addon_name,
                        track = %track,
                        url = %asset.url,
                        status,
                        body = %body,
                        "download failed"
                    );
                    stats.failed_downloads += 1;
                }
                Ok(FetchOutcome::ChallengeBlocked) => {
                    error!(
                        addon = %self.config.addon_name,
                        track = %track,
                        url = %asset.url,
                        "download blocked by bot defense"
                    );
                    stats.failed_downloads += 1;
                }
                Err(e) => {
                    error!(
                        addon = %self.config.addon_name,
                        track = %track,
                        url = %asset.url,
                        error = %e,
                        "download failed"
                    );
                    stats.failed_downloads += 1;
                }
            }
        }
        Ok(stats)
    }
}
