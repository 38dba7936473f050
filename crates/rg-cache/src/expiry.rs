//! Daily cache expiration boundary.

use chrono::{DateTime, Duration, Utc};

/// Next occurrence of the daily 03:00 UTC refresh boundary.
///
/// Advance `now` by exactly 24 hours, truncate to that date's midnight, add
/// three hours. Every entry written during one UTC day therefore expires at
/// the same instant on the following day, anchoring all cache entries to a
/// shared daily refresh rather than a sliding per-entry window.
pub fn expires_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let next_date = (now + Duration::hours(24)).date_naive();
    next_date
        .and_hms_opt(3, 0, 0)
        .expect("03:00:00 is a valid wall-clock time")
        .and_utc()
}
