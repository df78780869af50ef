//! Runtime configuration for a mirror run.
//!
//! Configuration is an explicit struct assembled and validated once at
//! startup; "is this the placeholder value" is a load-time check that logs a
//! warning, not a branch inside the acquisition flow.

use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::mirror::DEFAULT_PLAIN_ATTEMPTS;

/// Placeholder add-on name left behind by the scaffolding template.
pub const PLACEHOLDER_ADDON_NAME: &str = "ADDON_NAME_HERE";

/// Errors from configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No add-on name was supplied.
    #[error("no add-on name configured; pass one as an argument or set ADDON_NAME")]
    MissingAddonName,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Add-on URL name on the site (path segment of the listing page).
    pub addon_name: String,
    /// Numeric add-on id; `None` means "use the scraping path only".
    pub addon_id: Option<u32>,
    /// Structured-API key; required only when `addon_id` is set.
    pub api_key: Option<String>,
    /// Fetch-proxy key; required only if the fallback is ever entered.
    pub proxy_api_key: Option<String>,
    /// Directory downloaded files are written to.
    pub output_dir: PathBuf,
    /// Plain scrape attempts before the proxy fallback.
    pub plain_attempts: u32,
}

impl MirrorConfig {
    /// Creates a scrape-only configuration with defaults for everything but
    /// the add-on name.
    #[must_use]
    pub fn new(addon_name: impl Into<String>) -> Self {
        Self {
            addon_name: addon_name.into(),
            addon_id: None,
            api_key: None,
            proxy_api_key: None,
            output_dir: PathBuf::from("."),
            plain_attempts: DEFAULT_PLAIN_ATTEMPTS,
        }
    }

    /// Assembles and validates a configuration from raw startup inputs.
    ///
    /// Normalization rules:
    /// - a missing or empty add-on name is an error;
    /// - the scaffolding placeholder name logs a startup warning;
    /// - id `0` means "not configured";
    /// - an id without an API key logs a warning and disables the API path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAddonName`] when no usable add-on name
    /// was supplied.
    pub fn from_parts(
        addon_name: Option<String>,
        addon_id: u32,
        api_key: Option<String>,
        proxy_api_key: Option<String>,
        output_dir: PathBuf,
        plain_attempts: u32,
    ) -> Result<Self, ConfigError> {
        let addon_name = addon_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingAddonName)?;

        if addon_name == PLACEHOLDER_ADDON_NAME {
            warn!("placeholder add-on name is configured; was the scaffolding step run?");
        }

        let mut addon_id = (addon_id != 0).then_some(addon_id);
        if addon_id.is_some() && api_key.is_none() {
            warn!("add-on id configured without an API key; using the scraping path only");
            addon_id = None;
        }

        Ok(Self {
            addon_name,
            addon_id,
            api_key,
            proxy_api_key,
            output_dir,
            plain_attempts: plain_attempts.max(1),
        })
    }
}

/// Remote endpoints used by a run. Defaults point at the live services;
/// tests override them with mock servers.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Site base URL (listing and file-detail pages).
    pub site_base: String,
    /// Structured-API base URL.
    pub api_base: String,
    /// CDN base URL, including the shared files path.
    pub cdn_base: String,
    /// Fetch-proxy endpoint.
    pub proxy_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            site_base: "https://www.curseforge.com".to_string(),
            api_base: crate::api::DEFAULT_API_BASE.to_string(),
            cdn_base: "https://edge.forgecdn.net/files".to_string(),
            proxy_base: crate::fetch::DEFAULT_PROXY_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Absolute URL of the add-on's page (where the download sidebar lives).
    #[must_use]
    pub fn addon_url(&self, addon_name: &str) -> String {
        format!("{}/wow/addons/{addon_name}", self.site_base)
    }

    /// Site-relative files prefix stripped from listing hrefs.
    #[must_use]
    pub fn files_prefix(&self, addon_name: &str) -> String {
        format!("/wow/addons/{addon_name}/files/")
    }

    /// Absolute URL of one file-detail page.
    #[must_use]
    pub fn file_detail_url(&self, addon_name: &str, locator: &str) -> String {
        format!("{}/wow/addons/{addon_name}/files/{locator}", self.site_base)
    }

    /// Absolute CDN URL for a resolved asset.
    #[must_use]
    pub fn cdn_asset_url(&self, shard_a: &str, shard_b: &str, file_name: &str) -> String {
        format!("{}/{shard_a}/{shard_b}/{file_name}.zip", self.cdn_base)
    }
}
