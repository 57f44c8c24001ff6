//! Timestamp helpers.
//!
//! Timestamps are naive (timezone-free) nanoseconds since the Unix epoch,
//! which bounds the representable range to roughly 1677-09-21 .. 2262-04-11.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const NANOS_PER_MICRO: i64 = 1_000;
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_DAY: i64 = 86_400 * NANOS_PER_SECOND;
pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Convert a naive date-time to epoch nanoseconds, `None` when out of range.
pub fn nanos_from_datetime(value: NaiveDateTime) -> Option<i64> {
    value.and_utc().timestamp_nanos_opt()
}

/// Convert epoch nanoseconds to a naive date-time.
pub fn datetime_from_nanos(nanos: i64) -> NaiveDateTime {
    DateTime::from_timestamp_nanos(nanos).naive_utc()
}

/// Render epoch nanoseconds as `YYYY-MM-DD HH:MM:SS[.fraction]`.
pub fn format_nanos(nanos: i64) -> String {
    datetime_from_nanos(nanos)
        .format("%Y-%m-%d %H:%M:%S%.f")
        .to_string()
}

/// Parse `YYYY-MM-DD[ T]HH:MM:SS[.fraction]` or a bare `YYYY-MM-DD` into
/// epoch nanoseconds.
pub fn parse_nanos(value: &str) -> Option<i64> {
    let value = value.trim();
    let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    nanos_from_datetime(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_roundtrip() {
        let dt = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_nano_opt(5, 6, 7, 123_456_789)
            .unwrap();
        let nanos = nanos_from_datetime(dt).unwrap();
        assert_eq!(datetime_from_nanos(nanos), dt);
    }

    #[test]
    fn test_out_of_range() {
        let dt = NaiveDate::from_ymd_opt(2300, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(nanos_from_datetime(dt), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_nanos(0), "1970-01-01 00:00:00");
        assert_eq!(format_nanos(1_500_000_000), "1970-01-01 00:00:01.500");
    }

    #[test]
    fn test_parse_nanos() {
        assert_eq!(parse_nanos("1970-01-01 00:00:01.5"), Some(1_500_000_000));
        assert_eq!(parse_nanos("1970-01-02"), Some(NANOS_PER_DAY));
        assert_eq!(parse_nanos("1970-01-01T00:01:00"), Some(60 * NANOS_PER_SECOND));
        assert_eq!(parse_nanos("yesterday"), None);
    }
}
