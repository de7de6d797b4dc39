//! Display name validation.
//!
//! Names are the roster's map keys, so the rules are strict: at most 16
//! bytes, printable, no whitespace. Rename enforces them hard; joining is
//! forgiving and cleans the SSH username into something acceptable instead.

use crate::error::NameError;

/// Maximum display name length in bytes.
pub const MAX_NAME_BYTES: usize = 16;

const FALLBACK_NAME: &str = "guest";

/// Check a requested name against the rename rules.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() || name.len() > MAX_NAME_BYTES {
        return Err(NameError::Invalid(name.to_string()));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(NameError::Invalid(name.to_string()));
    }
    Ok(())
}

/// Reduce an arbitrary SSH username to a valid base name for joining.
///
/// Whitespace and control characters are dropped, the rest is truncated to
/// [`MAX_NAME_BYTES`] on a char boundary. An unusable input becomes `guest`.
pub fn clean_name(requested: &str) -> String {
    let mut cleaned = String::new();
    for c in requested.chars() {
        if c.is_whitespace() || c.is_control() {
            continue;
        }
        if cleaned.len() + c.len_utf8() > MAX_NAME_BYTES {
            break;
        }
        cleaned.push(c);
    }
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}
