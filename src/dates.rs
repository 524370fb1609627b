//! Calendar-date arithmetic for leave accounting.
//!
//! Every date that enters the system does so as a strict `YYYY-MM-DD`
//! string and is normalized to a plain calendar date, so comparisons and
//! day counts never drift with client or server timezones.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::AppError;

fn calendar_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

/// Parse a strict `YYYY-MM-DD` string into a calendar date.
///
/// Rejects anything that does not match the format exactly or does not
/// denote a real calendar date (e.g. `2024-02-30`).
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, AppError> {
    if !calendar_date_re().is_match(value) {
        return Err(AppError::BadRequest(format!(
            "Invalid date format: '{}'. Use YYYY-MM-DD",
            value
        )));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("'{}' is not a valid calendar date", value)))
}

/// Number of calendar days spanned by `[start, end]`, counting both
/// endpoints. Same day yields 1.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> Result<i64, AppError> {
    if start > end {
        return Err(AppError::InvalidRange(
            "End date cannot be before start date".to_string(),
        ));
    }

    Ok(end.signed_duration_since(start).num_days() + 1)
}

/// The UTC-midnight instant of a calendar date, for timestamp interop.
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight exists"))
}

/// Today as a UTC calendar date.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        parse_calendar_date(s).unwrap()
    }

    #[test]
    fn parses_strict_calendar_dates() {
        assert_eq!(
            date("2024-06-01"),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert_eq!(
            date("2024-02-29"), // leap day
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["2024-6-1", "06/01/2024", "2024-06-01T00:00:00Z", "", "yesterday"] {
            assert!(parse_calendar_date(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_calendar_date("2024-02-30").is_err());
        assert!(parse_calendar_date("2023-02-29").is_err());
        assert!(parse_calendar_date("2024-13-01").is_err());
        assert!(parse_calendar_date("2024-00-10").is_err());
    }

    #[test]
    fn same_day_counts_as_one() {
        let d = date("2024-06-01");
        assert_eq!(inclusive_day_count(d, d).unwrap(), 1);
    }

    #[test]
    fn counts_both_endpoints() {
        assert_eq!(
            inclusive_day_count(date("2024-06-01"), date("2024-06-05")).unwrap(),
            5
        );
        // Spans the leap day.
        assert_eq!(
            inclusive_day_count(date("2024-02-28"), date("2024-03-01")).unwrap(),
            3
        );
        // Same span in a non-leap year.
        assert_eq!(
            inclusive_day_count(date("2023-02-28"), date("2023-03-01")).unwrap(),
            2
        );
        // Across a year boundary.
        assert_eq!(
            inclusive_day_count(date("2024-12-30"), date("2025-01-02")).unwrap(),
            4
        );
    }

    #[test]
    fn reversed_range_fails() {
        let err = inclusive_day_count(date("2024-06-05"), date("2024-06-01")).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn utc_midnight_is_start_of_day() {
        let instant = utc_midnight(date("2024-06-01"));
        assert_eq!(instant.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }
}
