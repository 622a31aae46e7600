//! Local input validation
//!
//! Checks run before any request reaches the service: accepted image content
//! types, email shape, password strength and the six-digit confirmation code.

use crate::error::{Result, SnapLabelError};
use regex::Regex;
use std::sync::LazyLock;

/// Content types accepted for label generation
pub const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Special characters a password must draw at least one of
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Minimum password length
const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static CONFIRMATION_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("confirmation code pattern is valid"));

/// Whether `content_type` is one of [`ACCEPTED_IMAGE_TYPES`]
pub fn is_accepted_image_type(content_type: &str) -> bool {
    ACCEPTED_IMAGE_TYPES.contains(&content_type)
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(SnapLabelError::InvalidEmail(email.to_string()))
    }
}

/// Validate password strength
///
/// At least eight characters drawn from letters, digits and `@$!%*?&`, with at
/// least one lowercase letter, one uppercase letter, one digit and one special.
pub fn validate_password(password: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);

    let strong = password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if strong {
        Ok(())
    } else {
        Err(SnapLabelError::WeakPassword)
    }
}

/// Validate a one-time confirmation code (exactly six ASCII digits)
pub fn validate_confirmation_code(code: &str) -> Result<()> {
    if CONFIRMATION_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(SnapLabelError::InvalidConfirmationCode)
    }
}
