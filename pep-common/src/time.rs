//! Date and timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Average days per year, leap years included
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse an ISO `YYYY-MM-DD` date, tolerating surrounding whitespace and a
/// trailing time component (`2024-03-01T10:00:00Z`)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Fractional age in years between `date` and `today`
///
/// Future dates yield a negative age.
pub fn age_in_years(date: NaiveDate, today: NaiveDate) -> f64 {
    (today - date).num_days() as f64 / DAYS_PER_YEAR
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}
