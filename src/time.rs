use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::data::model::FieldValue;

// ---------------------------------------------------------------------------
// Spreadsheet serial dates
// ---------------------------------------------------------------------------

/// Days between the spreadsheet epoch (civil 1899-12-30, day 0) and the
/// Unix epoch (1970-01-01). The source exports encode dates either as this
/// day-count serial or as a plain date string, depending on how the sheet
/// was saved.
pub const SERIAL_UNIX_OFFSET_DAYS: f64 = 25_569.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Convert a spreadsheet day serial (fractional part = time of day) to an
/// absolute instant. Serials outside a sane chrono range yield `None`.
pub fn from_serial(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial - SERIAL_UNIX_OFFSET_DAYS) * MS_PER_DAY;
    // round, not truncate: serials stored as f64 carry sub-ms noise
    DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)
}

// ---------------------------------------------------------------------------
// Permissive string parsing
// ---------------------------------------------------------------------------

/// Date/time layouts seen across the exports. Naive stamps are taken as UTC;
/// the pipeline never mixes zones.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a date string permissively. Unparseable input is `None` — callers
/// treat it as an exclusion candidate, not an error.
pub fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Field-level normalizer
// ---------------------------------------------------------------------------

/// Normalize a raw date field into a canonical instant: numeric values are
/// spreadsheet day serials, strings go through the permissive parser.
pub fn normalize(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Integer(i) => from_serial(*i as f64),
        FieldValue::Float(f) => from_serial(*f),
        FieldValue::String(s) => parse_date_str(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn known_serial_date_pairs() {
        // Offset form and explicit 1899-12-30 epoch construction agree for
        // the working range; these pairs pin the chosen convention.
        assert_eq!(from_serial(25_569.0), Some(utc(1970, 1, 1, 0, 0, 0)));
        assert_eq!(from_serial(45_000.0), Some(utc(2023, 3, 15, 0, 0, 0)));
        assert_eq!(from_serial(45_292.0), Some(utc(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn fractional_serial_carries_time_of_day() {
        assert_eq!(from_serial(45_000.5), Some(utc(2023, 3, 15, 12, 0, 0)));
        assert_eq!(from_serial(45_000.25), Some(utc(2023, 3, 15, 6, 0, 0)));
    }

    #[test]
    fn non_finite_serial_is_invalid() {
        assert_eq!(from_serial(f64::NAN), None);
        assert_eq!(from_serial(f64::INFINITY), None);
    }

    #[test]
    fn parses_common_string_layouts() {
        assert_eq!(
            parse_date_str("2023-03-15 08:30:00"),
            Some(utc(2023, 3, 15, 8, 30, 0))
        );
        assert_eq!(
            parse_date_str("2023-03-15T08:30"),
            Some(utc(2023, 3, 15, 8, 30, 0))
        );
        assert_eq!(parse_date_str("2023-03-15"), Some(utc(2023, 3, 15, 0, 0, 0)));
        assert_eq!(
            parse_date_str("15/03/2023 08:30"),
            Some(utc(2023, 3, 15, 8, 30, 0))
        );
    }

    #[test]
    fn garbage_strings_are_invalid_not_fatal() {
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("pending"), None);
        assert_eq!(parse_date_str("2023-13-40"), None);
    }

    #[test]
    fn normalize_dispatches_on_value_type() {
        assert_eq!(
            normalize(&FieldValue::Float(45_000.0)),
            Some(utc(2023, 3, 15, 0, 0, 0))
        );
        assert_eq!(
            normalize(&FieldValue::Integer(45_000)),
            Some(utc(2023, 3, 15, 0, 0, 0))
        );
        assert_eq!(
            normalize(&FieldValue::String("2023-03-15".into())),
            Some(utc(2023, 3, 15, 0, 0, 0))
        );
        assert_eq!(normalize(&FieldValue::Null), None);
        assert_eq!(normalize(&FieldValue::Bool(true)), None);
    }
}
