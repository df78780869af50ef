//! Parsing of the add-on page download sidebar and of file-detail pages.
//!
//! The site renders the sidebar as alternating version-label / file-link
//! blocks. [`parse_listing`] walks those blocks in consecutive pairs: the
//! even element carries the version label, the odd element carries the
//! download anchor whose `href` (with the files prefix stripped) is the
//! partial locator. A malformed pair is skipped with a warning, never a
//! crash; whether an empty result is retried is the orchestrator's call.
//!
//! The listing itself does not name the file. That takes a second request to
//! the file-detail page, whose body goes through [`parse_file_name`].

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::asset::strip_archive_extension;
use crate::track::GameVersionTrack;

/// One download link discovered in the sidebar listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// The track the link was listed under.
    pub track: GameVersionTrack,
    /// Partial asset locator (the `href` with the files prefix stripped).
    pub locator: String,
}

/// Compiles a selector at static init; panics on invalid pattern.
fn compile_static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector '{css}': {e}"))
}

/// The sidebar's alternating label/link blocks.
static SIDEBAR_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.cf-sidebar-inner > *"));

/// The version label anchor inside an even block.
static VERSION_LABEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a"));

/// The download anchor inside an odd block.
static FILE_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("li > div > a.overflow-tip.truncate"));

/// The file-name element on a file-detail page.
static FILE_NAME: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("span.text-sm"));

/// Extracts per-track download locators from the add-on page HTML.
///
/// `files_prefix` is the site-relative files path (for example
/// `/wow/addons/foo/files/`) stripped from each anchor `href` to obtain the
/// bare locator. Unknown version labels and structurally incomplete pairs
/// are skipped.
#[must_use]
pub fn parse_listing(html: &str, files_prefix: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let blocks: Vec<ElementRef<'_>> = document.select(&SIDEBAR_BLOCKS).collect();
    debug!(blocks = blocks.len(), "found sidebar elements");

    let mut entries = Vec::new();
    for pair in blocks.chunks(2) {
        let &[label_block, link_block] = pair else {
            warn!("odd trailing element in download listing, skipping");
            continue;
        };
        let Some(label) = version_label(label_block) else {
            warn!("listing pair missing version label, skipping");
            continue;
        };
        let Some(track) = GameVersionTrack::from_label(&label) else {
            warn!(label = %label, "unrecognized game version label, skipping");
            continue;
        };
        let Some(href) = link_block
            .select(&FILE_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            warn!(track = %track, "listing pair missing file link, skipping");
            continue;
        };
        let locator = href.strip_prefix(files_prefix).unwrap_or(href).to_string();
        entries.push(ListingEntry { track, locator });
    }
    entries
}

/// First text of the label anchor in an even block, trimmed.
fn version_label(block: ElementRef<'_>) -> Option<String> {
    let anchor = block.select(&VERSION_LABEL).next()?;
    let text: String = anchor.text().collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extracts the file name from a file-detail page, without the archive
/// extension. Returns `None` when the expected element is absent or empty.
#[must_use]
pub fn parse_file_name(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(&FILE_NAME).next()?;
    let text: String = element.text().collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(strip_archive_extension(trimmed))
}
