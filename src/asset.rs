//! Download assets: the normalized output shape shared by both acquisition
//! paths.
//!
//! The scraping path yields site-specific partial locators that still need
//! shard decoding; the structured-API path yields complete download URLs.
//! Both produce the same per-track mapping so the rest of the pipeline does
//! not care where a record came from.

use std::collections::BTreeMap;

use crate::track::GameVersionTrack;

/// Where a downloadable asset lives, as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Partial file identifier from a scraped download link; must be decoded
    /// into CDN path shards before it can be fetched.
    Locator(String),
    /// Complete direct download URL from the structured API.
    Direct(String),
}

/// One downloadable asset for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Site-specific locator or direct URL.
    pub location: AssetLocation,
    /// Base file name without the archive extension, as reported by the
    /// source.
    pub file_name: String,
}

/// Per-track mapping of discovered assets. Keys are present only for tracks
/// where a download was actually found.
pub type DownloadMapping = BTreeMap<GameVersionTrack, AssetRecord>;

/// An asset after resolution: the final absolute URL to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Absolute download URL.
    pub url: String,
    /// Base file name without the archive extension.
    pub file_name: String,
}

/// Strips a trailing `.zip` from a source-reported file name.
#[must_use]
pub(crate) fn strip_archive_extension(name: &str) -> String {
    name.strip_suffix(".zip").unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_archive_extension() {
        assert_eq!(strip_archive_extension("Foo-1.2.zip"), "Foo-1.2");
        assert_eq!(strip_archive_extension("Foo-1.2"), "Foo-1.2");
        // Only a trailing extension is removed.
        assert_eq!(strip_archive_extension("Foo.zip.bak"), "Foo.zip.bak");
    }
}
