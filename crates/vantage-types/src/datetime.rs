//! Timestamp formats used by the console and the record store.
//!
//! Two fixed-width textual formats exist side by side and the asymmetry is
//! deliberate: persisted records and the console clock carry second
//! precision, while user-supplied query boundaries (start/stop of a fetch
//! window) are minute precision.

use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::{ParseError, ParseResult};

/// Second-precision format used for persisted `Datetime` values.
pub const DATETIME_SECONDS: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Minute-precision format used for user-supplied window boundaries.
pub const DATETIME_MINUTES: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// Console timestamps are naive local time; there is no UTC offset to carry.
pub fn parse_seconds(value: &str) -> ParseResult<PrimitiveDateTime> {
    PrimitiveDateTime::parse(value, DATETIME_SECONDS)
        .map_err(|e| ParseError::invalid_timestamp(value, e.to_string()))
}

/// Parse a `YYYY-MM-DD HH:MM` timestamp (seconds are implied zero).
pub fn parse_minutes(value: &str) -> ParseResult<PrimitiveDateTime> {
    PrimitiveDateTime::parse(value, DATETIME_MINUTES)
        .map_err(|e| ParseError::invalid_timestamp(value, e.to_string()))
}

/// Format a timestamp in the second-precision store format.
pub fn format_seconds(datetime: PrimitiveDateTime) -> String {
    datetime
        .format(DATETIME_SECONDS)
        .expect("well-formed format description")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_seconds() {
        let dt = parse_seconds("2024-01-01 00:05:30").unwrap();
        assert_eq!(dt, datetime!(2024-01-01 00:05:30));
    }

    #[test]
    fn test_parse_minutes() {
        let dt = parse_minutes("2024-01-01 00:05").unwrap();
        assert_eq!(dt, datetime!(2024-01-01 00:05:00));
    }

    #[test]
    fn test_parse_seconds_rejects_minute_precision() {
        assert!(parse_seconds("2024-01-01 00:05").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_seconds("not a date").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTimestamp { .. }));
        assert!(err.to_string().contains("not a date"));
    }

    #[test]
    fn test_format_round_trip() {
        let dt = datetime!(2012-06-13 16:44:56);
        let text = format_seconds(dt);
        assert_eq!(text, "2012-06-13 16:44:56");
        assert_eq!(parse_seconds(&text).unwrap(), dt);
    }

    #[test]
    fn test_lexicographic_order_matches_chronological() {
        // The store sorts on the textual value, so the fixed-width format
        // must order the same way the timestamps do.
        let a = format_seconds(datetime!(2024-01-01 09:59:59));
        let b = format_seconds(datetime!(2024-01-01 10:00:00));
        assert!(a < b);
    }
}
