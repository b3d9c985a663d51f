//! Canonical first-of-month normalization for warehouse date columns.
//!
//! Warehouse exports carry the `MONTH` column in whatever shape the
//! upstream view produced: plain dates, timestamps with fractional
//! seconds, ISO-8601 strings, or compact `YYYYMM`-style labels. Everything
//! normalizes to the first day of its month; values that cannot be parsed
//! yield `None` and the row is kept.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime};

/// Date-only formats tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Timestamp formats tried in order (fractional seconds optional).
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Truncates a date to the first day of its month.
#[must_use]
pub fn truncate(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Normalizes a raw warehouse value to a first-of-month date.
///
/// Accepts JSON strings in any of the supported date/timestamp formats.
/// Anything else (nulls, numbers, unparseable text) yields `None`.
#[must_use]
pub fn normalize(raw: &serde_json::Value) -> Option<NaiveDate> {
    raw.as_str().and_then(normalize_str)
}

/// Normalizes a raw date string to a first-of-month date.
///
/// Idempotent: a value that is already a first-of-month date normalizes
/// to itself.
#[must_use]
pub fn normalize_str(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = parse_date(trimmed);
    if parsed.is_none() {
        log::debug!("Unparseable month value: {trimmed:?}");
    }
    parsed.map(truncate)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }

    // Offset-bearing ISO-8601 timestamps (e.g. "2023-05-01T00:00:00+09:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Year-month labels like "2023-05"
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(date);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_2023() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
    }

    #[test]
    fn normalizes_plain_dates() {
        assert_eq!(normalize_str("2023-05-17"), Some(may_2023()));
        assert_eq!(normalize_str("2023/05/17"), Some(may_2023()));
        assert_eq!(normalize_str("20230517"), Some(may_2023()));
    }

    #[test]
    fn normalizes_timestamps() {
        assert_eq!(normalize_str("2023-05-17 08:30:00"), Some(may_2023()));
        assert_eq!(normalize_str("2023-05-17 08:30:00.123"), Some(may_2023()));
        assert_eq!(normalize_str("2023-05-17T08:30:00+09:00"), Some(may_2023()));
    }

    #[test]
    fn normalizes_year_month_labels() {
        assert_eq!(normalize_str("2023-05"), Some(may_2023()));
    }

    #[test]
    fn unparseable_values_yield_none() {
        assert_eq!(normalize_str("not a date"), None);
        assert_eq!(normalize_str(""), None);
        assert_eq!(normalize_str("2023-13-01"), None);
        assert_eq!(normalize(&serde_json::Value::Null), None);
        assert_eq!(normalize(&serde_json::json!(12.5)), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["2023-05-17", "2023-05-17 08:30:00", "2023-05", "20230517"] {
            let once = normalize_str(raw).unwrap();
            let twice = normalize_str(&once.format("%Y-%m-%d").to_string()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn truncate_is_idempotent() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 17).unwrap();
        assert_eq!(truncate(date), may_2023());
        assert_eq!(truncate(truncate(date)), may_2023());
    }
}
