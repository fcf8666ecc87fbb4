//! Key naming policy
//!
//! Key names share the platform-wide pattern used for every named resource.
//! Application keys additionally live under the `app-` namespace.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

/// Pattern every named resource must match
pub const NAME_PATTERN: &str = r"^[a-zA-Z0-9._-]{1,}$";

/// Namespace prefix carried by every application key
pub const APPLICATION_KEY_PREFIX: &str = "app-";

static NAME_PATTERN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(NAME_PATTERN).unwrap());

/// Check a proposed key name against [`NAME_PATTERN`]
///
/// The error reports the name exactly as the caller typed it.
pub fn validate_key_name(name: &str) -> Result<(), DomainError> {
    if !NAME_PATTERN_REGEX.is_match(name) {
        return Err(DomainError::invalid_key_pattern(name, NAME_PATTERN));
    }

    Ok(())
}

/// Put a name under the application key namespace; idempotent
pub fn normalize_key_name(name: &str) -> String {
    if name.starts_with(APPLICATION_KEY_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", APPLICATION_KEY_PREFIX, name)
    }
}

/// Validate then normalize a proposed key name
pub fn normalize_and_validate(name: &str) -> Result<String, DomainError> {
    validate_key_name(name)?;
    Ok(normalize_key_name(name))
}
