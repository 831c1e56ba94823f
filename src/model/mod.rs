//! Entity records and their field-validation schemas.

pub mod booking;
pub mod dentist;
pub mod schema;
pub mod user;

pub use booking::*;
pub use dentist::*;
pub use schema::*;
pub use user::*;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a timestamp as accepted in bodies and query strings: RFC 3339,
/// `YYYY-MM-DDTHH:MM:SS[.f]` (UTC), or `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
