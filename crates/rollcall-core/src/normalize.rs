//! Email and phone normalization.
//!
//! Both functions are idempotent: normalizing an already normalized value
//! returns it unchanged.

use regex::Regex;
use std::sync::LazyLock;

/// Pattern an email must match, applied to the value as submitted.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Minimum length of a phone number once separators are stripped.
pub const MIN_PHONE_LEN: usize = 10;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

/// Trims and lower-cases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Removes whitespace, `-`, `(` and `)` from a phone number.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// Whether the email, as submitted, has the shape `local@domain.tld`.
///
/// Surrounding whitespace fails the check; trimming is left to
/// [`normalize_email`].
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
