//! Calendar labels derived from epoch milliseconds.

use time::OffsetDateTime;

#[cfg(test)]
#[path = "dates_test.rs"]
mod dates_test;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Lifetime of an invitation link.
pub const INVITATION_TTL_MS: i64 = 7 * DAY_MS;

fn datetime(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}

/// Half-year review period, e.g. `2026-H2`.
#[must_use]
pub fn period_label(ms: i64) -> String {
    match datetime(ms) {
        Some(dt) => {
            let half = if u8::from(dt.month()) <= 6 { 1 } else { 2 };
            format!("{}-H{half}", dt.year())
        }
        None => String::from("unknown"),
    }
}

/// `YYYY-MM-DD` (UTC).
#[must_use]
pub fn date_label(ms: i64) -> String {
    match datetime(ms) {
        Some(dt) => format!("{:04}-{:02}-{:02}", dt.year(), u8::from(dt.month()), dt.day()),
        None => String::from("-"),
    }
}
