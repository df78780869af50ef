//! Game-version tracks supported by the mirror.
//!
//! The set of tracks is closed: CurseForge hosts one add-on file stream per
//! World of Warcraft variant, and every per-track mapping in this crate is
//! keyed by [`GameVersionTrack`]. Tracks order deterministically so maps
//! iterate (and log) in a stable order.

use std::fmt;

/// One of the four supported WoW variants of an add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameVersionTrack {
    /// Current mainline release ("WoW Retail").
    Retail,
    /// Classic Era ("WoW Classic").
    Classic,
    /// Burning Crusade Classic.
    BurningCrusadeClassic,
    /// Wrath of the Lich King Classic.
    WrathClassic,
}

impl GameVersionTrack {
    /// All supported tracks, in canonical order.
    pub const ALL: [Self; 4] = [
        Self::Retail,
        Self::Classic,
        Self::BurningCrusadeClassic,
        Self::WrathClassic,
    ];

    /// The version label as rendered on the site's download listing.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Retail => "WoW Retail",
            Self::Classic => "WoW Classic",
            Self::BurningCrusadeClassic => "WoW Burning Crusade Classic",
            Self::WrathClassic => "WoW Wrath of the Lich King Classic",
        }
    }

    /// File-name suffix appended to downloaded archives for this track.
    ///
    /// Retail files carry no suffix; the other tracks are disambiguated so
    /// all four archives can sit in one directory.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Retail => "",
            Self::Classic => "-classic",
            Self::BurningCrusadeClassic => "-bc",
            Self::WrathClassic => "-wrath",
        }
    }

    /// CurseForge game-version-type code used by the files API filter.
    #[must_use]
    pub fn version_type_id(self) -> u32 {
        match self {
            Self::Retail => 517,
            Self::Classic => 67408,
            Self::BurningCrusadeClassic => 73246,
            Self::WrathClassic => 73713,
        }
    }

    /// Maps a listing version label back to a track, if it is one of the
    /// supported four.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|track| track.label() == label)
    }
}

impl fmt::Display for GameVersionTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the on-disk archive name for a base file name and track.
///
/// The track suffix is appended only when the base name does not already end
/// with it, so sources that encode the track in their file names are never
/// double-suffixed. Applying the rule twice yields the same result as
/// applying it once.
#[must_use]
pub fn archive_file_name(base: &str, track: GameVersionTrack) -> String {
    let suffix = track.suffix();
    if base.ends_with(suffix) {
        format!("{base}.zip")
    } else {
        format!("{base}{suffix}.zip")
    }
}
