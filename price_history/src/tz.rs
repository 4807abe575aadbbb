//! Time zone conversion helpers for provider timestamps.
//!
//! Providers report bar times as UTC epoch seconds together with the
//! exchange's IANA zone (e.g. "America/New_York") and/or its GMT offset. Price
//! tables are keyed by zone-less timestamps, so every bar is moved onto the
//! exchange's wall clock before the zone is dropped:
//!
//! - [`exchange_wall_clock`]: epoch seconds -> naive exchange-local timestamp.
//! - [`start_of_day`]: truncate to midnight, used for daily and coarser bars.
//! - [`utc_day_start_epoch`]: the epoch second a calendar day starts at in UTC.
//!
//! Example
//! - 2024-03-11T13:30:00Z on "America/New_York" -> 2024-03-11 09:30:00
//! - 2024-01-04T23:00:00Z on "Asia/Tokyo"       -> 2024-01-05 08:00:00

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

/// Converts epoch seconds to the exchange's naive wall-clock time.
///
/// The IANA zone wins when it parses; otherwise the fixed GMT offset (in
/// seconds) is used; with neither, the UTC wall clock is returned. `None`
/// only for epoch values chrono cannot represent.
pub fn exchange_wall_clock(
    epoch_secs: i64,
    tz_name: Option<&str>,
    gmt_offset_secs: Option<i32>,
) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp(epoch_secs, 0)?;

    if let Some(tz) = tz_name.and_then(|name| name.parse::<Tz>().ok()) {
        return Some(utc.with_timezone(&tz).naive_local());
    }
    if let Some(offset) = gmt_offset_secs.and_then(FixedOffset::east_opt) {
        return Some(utc.with_timezone(&offset).naive_local());
    }
    Some(utc.naive_utc())
}

/// Midnight of the timestamp's calendar day.
pub fn start_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}

/// Epoch seconds of `date` at 00:00 UTC.
pub fn utc_day_start_epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
