//! Input validation helpers

use crate::error::ApiError;

/// Minimum allowed password length
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum allowed password length
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Trimmed value of an optional field, `None` when absent or blank
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Account email check: no whitespace, and `local@domain.tld` shaped
pub fn is_valid_account_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    // Any '@' may act as the separator
    email
        .match_indices('@')
        .any(|(at, _)| at > 0 && has_inner_dot(&email[at + 1..]))
}

/// Contact email check: exactly one '@', no whitespace, dotted domain
pub fn is_valid_contact_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.contains('@') && has_inner_dot(domain),
        None => false,
    }
}

/// Whether `s` contains a '.' with at least one character on each side
fn has_inner_dot(s: &str) -> bool {
    s.char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < s.len())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
