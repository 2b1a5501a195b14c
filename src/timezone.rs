use core::fmt::Write as _;

use time::{Date, Month, OffsetDateTime, UtcOffset, Weekday};

use crate::config::DeviceConfiguration;

fn ordinal(n: u8) -> &'static str {
    match n {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Pick the UTC offset to display local times with.
///
/// A live offset (e.g. from the weather API response) wins when it is
/// representable; otherwise the configured fallback is used.
pub fn resolve_offset(
    live_offset_secs: Option<i32>,
    config: &DeviceConfiguration<'_>,
) -> UtcOffset {
    match live_offset_secs.map(UtcOffset::from_whole_seconds) {
        Some(Ok(offset)) => offset,
        Some(Err(_)) => {
            log::warn!("Ignoring unrepresentable live UTC offset, using configured default");
            config.default_utc_offset()
        }
        None => config.default_utc_offset(),
    }
}

/// Convert a unix timestamp to local wall-clock time.
pub fn local_time(unix_secs: i64, offset: UtcOffset) -> Option<OffsetDateTime> {
    // shift the timestamp, then relabel the wall clock with the offset
    let shifted = unix_secs.checked_add(i64::from(offset.whole_seconds()))?;
    let local = OffsetDateTime::from_unix_timestamp(shifted).ok()?;
    Some(local.replace_offset(offset))
}

/// Format an offset as `UTC+09:00` / `UTC-05:00`.
pub fn format_offset(offset: UtcOffset) -> heapless::String<16> {
    let mut out = heapless::String::<16>::new();
    let (hours, minutes, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    let _ = write!(
        out,
        "UTC{}{:02}:{:02}",
        sign,
        hours.unsigned_abs(),
        minutes.unsigned_abs()
    );
    out
}

pub fn format_date(date: Date) -> heapless::String<64> {
    let mut out = heapless::String::<64>::new();

    let weekday = match date.weekday() {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    };

    let month_name = match date.month() {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    };

    let day = date.day();
    let _ = write!(
        out,
        "{} {} {}{}, {}",
        weekday,
        month_name,
        day,
        ordinal(day),
        date.year()
    );

    out
}
