//! Fatal error taxonomy for the acquisition orchestrator.
//!
//! Per-track download failures and parse gaps are logged and survived; only
//! the conditions below end the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;
use crate::locator::LocatorError;

/// Errors that abort a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Neither the API path nor any scrape attempt (plain or fallback)
    /// produced a download mapping.
    #[error("no downloads found for add-on '{addon}' after {attempts} scrape attempts")]
    NoDownloadsFound {
        /// The add-on name that was being mirrored.
        addon: String,
        /// Total scrape attempts made, fallback included.
        attempts: u32,
    },

    /// A scraped locator did not match the shard-decoding rule. The remote
    /// id format changed; refusing to guess.
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// A downloaded file could not be written to disk.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An HTTP client could not be built or rebuilt.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl MirrorError {
    /// Creates the terminal no-downloads-found error.
    pub fn no_downloads_found(addon: impl Into<String>, attempts: u32) -> Self {
        Self::NoDownloadsFound {
            addon: addon.into(),
            attempts,
        }
    }

    /// Creates a file-write error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_downloads_found_display() {
        let error = MirrorError::no_downloads_found("my-addon", 11);
        let msg = error.to_string();
        assert!(msg.contains("no downloads found"), "got: {msg}");
        assert!(msg.contains("my-addon"), "got: {msg}");
        assert!(msg.contains("11"), "got: {msg}");
    }

    #[test]
    fn test_locator_error_is_transparent() {
        let source = crate::locator::resolve_locator("1234").unwrap_err();
        let expected = source.to_string();
        let error = MirrorError::from(source);
        assert_eq!(error.to_string(), expected);
    }
}
