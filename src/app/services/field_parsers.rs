//! Field parsing utilities for participant export values
//!
//! Every parser takes a raw token (possibly empty) and returns `Some(value)` or
//! `None`. Malformed input never produces an error: empty or unparseable tokens
//! become null and the row carries on.

use crate::constants::{
    DATE_FORMATS, DATETIME_FORMATS, FALSE_TOKENS, OFFSET_DATETIME_FORMATS, TRUE_TOKENS,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a calendar date or date-time as a naive local timestamp
///
/// Accepts `MM/DD/YYYY HH:mm`, `MM/DD/YYYY`, ISO `YYYY-MM-DD` and ISO
/// date-times. Date-only values land at midnight. A `Z` or numeric offset is
/// dropped and the wall-clock time is kept as written.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .or_else(|| {
                    OFFSET_DATETIME_FORMATS
                        .iter()
                        .find_map(|format| DateTime::parse_from_str(value, format).ok())
                })
                .map(|parsed| parsed.naive_local())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse a floating point number; non-numeric and non-finite values are null
pub fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a yes/no style flag, case-insensitively
pub fn parse_bool(raw: &str) -> Option<bool> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return None;
    }

    if TRUE_TOKENS.contains(&value.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parse a whole-number field, rounding to the nearest integer when present
pub fn parse_rounded(raw: &str) -> Option<i64> {
    parse_number(raw).map(|n| n.round() as i64)
}

/// Keep a text token only when it is non-empty after trimming
pub fn parse_text(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_empty_input_is_null_for_every_parser() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_rounded(""), None);
        assert_eq!(parse_text(""), None);
        assert_eq!(parse_text("   "), None);
    }

    #[test]
    fn test_parse_date_us_datetime() {
        let parsed = parse_date("03/15/2023 14:30").unwrap();
        assert_eq!(parsed.year(), 2023);
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 15);
        assert_eq!(parsed.hour(), 14);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_parse_date_iso_and_date_only() {
        let iso = parse_date("2024-01-09").unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2024, 1, 9));
        assert_eq!(iso.hour(), 0);

        let us = parse_date("7/4/2022").unwrap();
        assert_eq!((us.year(), us.month(), us.day()), (2022, 7, 4));

        let full = parse_date("2024-01-09T08:15:00").unwrap();
        assert_eq!(full.hour(), 8);
    }

    #[test]
    fn test_parse_date_iso_minutes_only() {
        let parsed = parse_date("2024-01-09 08:15").unwrap();
        assert_eq!((parsed.day(), parsed.hour(), parsed.minute()), (9, 8, 15));

        let with_t = parse_date("2024-01-09T08:15").unwrap();
        assert_eq!(with_t, parsed);
    }

    #[test]
    fn test_parse_date_with_offset_keeps_wall_clock() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();

        assert_eq!(parse_date("2024-01-09T08:15:00Z"), Some(expected));
        assert_eq!(parse_date("2024-01-09T08:15:00-05:00"), Some(expected));
        assert_eq!(parse_date("2024-01-09T08:15:00+0530"), Some(expected));

        let fractional = parse_date("2024-01-09T08:15:00.250Z").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_date_garbage_is_null() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("13/45/2023"), None);
        assert_eq!(parse_date("2023-02-30"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12000"), Some(12000.0));
        assert_eq!(parse_number("-500"), Some(-500.0));
        assert_eq!(parse_number(" 3.25 "), Some(3.25));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_bool_is_case_insensitive() {
        for token in ["YES", "yes", "Yes", "true", "TRUE", "1"] {
            assert_eq!(parse_bool(token), Some(true), "token {token}");
        }
        for token in ["No", "no", "false", "0"] {
            assert_eq!(parse_bool(token), Some(false), "token {token}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn test_parse_rounded_rounds_only_when_present() {
        assert_eq!(parse_rounded("3.6"), Some(4));
        assert_eq!(parse_rounded("3.4"), Some(3));
        assert_eq!(parse_rounded("212"), Some(212));
        assert_eq!(parse_rounded("n/a"), None);
    }
}
