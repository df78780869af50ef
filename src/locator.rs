//! Decoding of partial asset locators into CDN path shards.
//!
//! The CDN buckets stored files in a shallow two-level directory derived from
//! the numeric file id. The split is keyed purely by locator length and is
//! reproduced here exactly; it is not a general algorithm and must not be
//! "fixed" when it looks lossy.

use thiserror::Error;

/// Errors from locator decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// The locator length is outside the recognized set. This signals that
    /// the remote id scheme changed in a way the shard rule cannot guess
    /// around, so callers must abort rather than skip.
    #[error("unrecognized locator format: '{locator}' has length {length}, expected 5, 6 or 7")]
    UnrecognizedFormat {
        /// The offending locator.
        locator: String,
        /// Its character length.
        length: usize,
    },
}

/// Decodes a locator into the `(shard_a, shard_b)` CDN path segments.
///
/// Rule, keyed by locator length:
/// - 7 characters: first 4 / last 3
/// - 6 characters: first 3 / last 3
/// - 5 characters: first 3 / last 2
///
/// # Errors
///
/// Returns [`LocatorError::UnrecognizedFormat`] for any other length.
pub fn resolve_locator(locator: &str) -> Result<(String, String), LocatorError> {
    let chars: Vec<char> = locator.chars().collect();
    let split_at = match chars.len() {
        7 => 4,
        5 | 6 => 3,
        length => {
            return Err(LocatorError::UnrecognizedFormat {
                locator: locator.to_string(),
                length,
            });
        }
    };
    let shard_a: String = chars[..split_at].iter().collect();
    let shard_b: String = chars[split_at..].iter().collect();
    Ok((shard_a, shard_b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_length_seven() {
        let (a, b) = resolve_locator("4120051").unwrap();
        assert_eq!(a, "4120");
        assert_eq!(b, "051");
    }

    #[test]
    fn test_resolve_length_six() {
        let (a, b) = resolve_locator("412005").unwrap();
        assert_eq!(a, "412");
        assert_eq!(b, "005");
    }

    #[test]
    fn test_resolve_length_five() {
        let (a, b) = resolve_locator("41200").unwrap();
        assert_eq!(a, "412");
        assert_eq!(b, "00");
    }

    #[test]
    fn test_shards_reconstruct_original() {
        for locator in ["4120051", "412005", "41200"] {
            let (a, b) = resolve_locator(locator).unwrap();
            assert_eq!(format!("{a}{b}"), locator);
        }
    }

    #[test]
    fn test_unrecognized_lengths_fail() {
        for locator in ["", "1", "1234", "12345678"] {
            let err = resolve_locator(locator).unwrap_err();
            match err {
                LocatorError::UnrecognizedFormat { length, .. } => {
                    assert_eq!(length, locator.chars().count());
                }
            }
        }
    }

    #[test]
    fn test_error_message_names_the_locator() {
        let err = resolve_locator("1234").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1234"), "expected locator in: {msg}");
        assert!(msg.contains("unrecognized"), "expected reason in: {msg}");
    }
}
