//! Identifier validation.

use crate::error::ValidationError;

/// Shortest accepted identifier.
const MIN_LEN: usize = 5;
/// Longest accepted identifier.
const MAX_LEN: usize = 11;

/// Check whether `identifier` is 5-11 ASCII digits with a non-zero first digit.
#[must_use]
pub fn is_valid(identifier: &str) -> bool {
    let bytes = identifier.as_bytes();
    if !(MIN_LEN..=MAX_LEN).contains(&bytes.len()) {
        return false;
    }
    matches!(bytes[0], b'1'..=b'9') && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Validate an identifier, keeping the rejected value in the error.
///
/// # Errors
///
/// Returns an error if [`is_valid`] rejects the identifier.
pub fn validate_identifier(identifier: &str) -> Result<(), ValidationError> {
    if is_valid(identifier) {
        Ok(())
    } else {
        Err(ValidationError { identifier: identifier.to_string() })
    }
}
