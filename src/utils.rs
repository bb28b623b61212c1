/// Shared parsing helpers for station exports
use chrono::{DateTime, NaiveDateTime};

const TIMESTAMP_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a station timestamp into a naive local datetime
///
/// Accepts ISO-like dates (space or `T` separator, optional seconds and
/// fractions), `YYYY/MM/DD` and US `MM/DD/YYYY` forms. RFC 3339 values with
/// an offset keep their wall-clock time, since the whole series is assumed
/// to share one timezone.
///
/// # Examples
///
/// ```
/// use eto_daily_service::utils::parse_timestamp;
///
/// let ts = parse_timestamp("2025-03-09 07:05:00").unwrap();
/// assert_eq!(ts.to_string(), "2025-03-09 07:05:00");
/// assert_eq!(parse_timestamp("3/9/2025 07:05").unwrap(), ts);
/// assert_eq!(parse_timestamp("2025-03-09T07:05:00+07:00").unwrap(), ts);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Parse a numeric cell, tolerating surrounding whitespace
///
/// Returns `None` for blanks and non-numeric text such as "N/A".
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonical form of a column header for matching
///
/// Spreadsheet tools sometimes prefix the first header with a UTF-8 BOM;
/// matching is also case-insensitive.
pub fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}
