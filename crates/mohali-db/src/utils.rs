//! Shared utility functions

use chrono::{DateTime, Utc};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Rows are written by this crate, so a parse failure only happens if the
/// file was edited by hand; falling back keeps listing endpoints usable.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Generate a new record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Canonical form of an email address used for storage and lookups
///
/// # Examples
///
/// ```
/// use mohali_db::utils::normalize_email;
///
/// assert_eq!(normalize_email("  Asha@Example.COM "), "asha@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
