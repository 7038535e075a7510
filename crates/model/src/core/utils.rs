use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a calendar day written as `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parses a timestamp in the formats accepted on input.
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, the `T`-separated variant and
/// RFC 3339 (converted to UTC, offset dropped).
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.naive_utc())
                .ok()
        })
}

/// Midnight at the start of `day`.
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// Midnight at the start of the day after `day`, `None` past the calendar range.
pub fn start_of_next_day(day: NaiveDate) -> Option<NaiveDateTime> {
    day.succ_opt().map(start_of_day)
}
