//! Key validation for path segments.
//!
//! The store accepts any non-empty UTF-8 key except:
//! - Keys containing `.`, `$`, `#`, `[` or `]`
//! - Keys containing ASCII control characters (including DEL)
//! - Keys containing `/`, which always separates segments

use crate::error::{PathError, PathResult};

/// Characters that are forbidden anywhere in a key.
const FORBIDDEN_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Validate a single path segment, returning `Ok(())` if it is a legal key.
///
/// # Examples
///
/// ```
/// use rtdb_types::names::validate_segment;
///
/// assert!(validate_segment("users").is_ok());
/// assert!(validate_segment("-NxKq3").is_ok());
/// assert!(validate_segment("").is_err());
/// assert!(validate_segment("a.b").is_err());
/// ```
pub fn validate_segment(segment: &str) -> PathResult<()> {
    if segment.is_empty() {
        return Err(PathError::InvalidSegment {
            segment: segment.to_string(),
            reason: "segment must not be empty".into(),
        });
    }

    for ch in FORBIDDEN_CHARS {
        if segment.contains(*ch) {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    if let Some(ch) = segment.chars().find(|c| c.is_ascii_control()) {
        return Err(PathError::InvalidSegment {
            segment: segment.to_string(),
            reason: format!("contains control character: {ch:?}"),
        });
    }

    Ok(())
}
