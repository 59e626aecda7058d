use chrono::prelude::*;
use chrono::Duration;
use std::fmt::Display;

/// Formats when a dose was last taken: time only when it was within the last
/// 24 hours, date and time otherwise.
pub fn format_last_taken<Tz: TimeZone>(taken: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let since = now.clone().signed_duration_since(taken.clone());
    if since < Duration::hours(24) {
        taken.format("%H:%M").to_string()
    } else {
        taken.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Offset of the device clock from UTC, derived from two readings of the same
/// instant and rounded to whole minutes. Falls back to UTC for offsets no
/// real timezone has.
pub fn local_offset(local_now: NaiveDateTime, utc_now: DateTime<Utc>) -> FixedOffset {
    let diff = local_now - utc_now.naive_utc();
    let seconds = ((diff.num_seconds() as f64 / 60.0).round() as i32) * 60;
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}
