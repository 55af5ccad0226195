use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// A classified cell value, ready for export formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Blank,
    Number(Decimal),
    Currency(Decimal),
    /// Stored as a fraction: "87.3%" is 0.873.
    Percent(Decimal),
    Date(NaiveDate),
    Text(String),
}

/// Markers that stand for "no value" in statements and reports.
const BLANK_MARKERS: &[&str] = &["-", "N/A", "n/a"];

/// Whether a raw cell carries no value at all.
pub fn is_blank(raw: &str) -> bool {
    let s = raw.trim();
    s.is_empty() || BLANK_MARKERS.contains(&s)
}

/// Classify a raw cell string.
///
/// Order of attempts: blank, percent, currency (`$` present), plain number,
/// date, text.
pub fn classify(raw: &str) -> CellValue {
    let s = raw.trim();
    if is_blank(s) {
        return CellValue::Blank;
    }

    if s.ends_with('%') {
        if let Some(fraction) = parse_amount(s) {
            return CellValue::Percent(fraction);
        }
    }

    if s.contains('$') {
        if let Some(amount) = parse_amount(s) {
            return CellValue::Currency(amount);
        }
    }

    if let Some(n) = parse_amount(s) {
        return CellValue::Number(n);
    }

    if let Some(date) = parse_date(s) {
        return CellValue::Date(date);
    }

    CellValue::Text(s.to_string())
}

/// Parse a numeric cell, tolerating `$`, thousands separators and a trailing
/// `%` (which divides the result by 100).
///
/// - "$1,234.50" -> 1234.50
/// - "12.3%" -> 0.123
/// - "-" / "N/A" / "" -> None
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if is_blank(s) {
        return None;
    }

    let (body, percent) = match s.strip_suffix('%') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let cleaned: String = body.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    // Decimal parsing skips `_`, and inner spaces would join two numbers.
    if cleaned.is_empty()
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return None;
    }

    let value = Decimal::from_str(cleaned).ok()?;
    if percent {
        Some(value / Decimal::ONE_HUNDRED)
    } else {
        Some(value)
    }
}

/// Whether a cell reads as a numeric amount (currency, plain number or percent).
pub fn looks_like_amount(raw: &str) -> bool {
    parse_amount(raw).is_some()
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a date string permissively and normalize it to a UTC calendar date.
///
/// Accepts ISO dates, US `M/D/YYYY`, month-name forms, naive date-times and
/// RFC 3339 timestamps (converted to UTC before the date is taken).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Convert a spreadsheet date serial (1900 date system) to a calendar date.
///
/// Serial 1 is 1900-01-01. Serials from 61 on account for the phantom
/// 1900-02-29 that spreadsheet programs keep for compatibility.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_signed(chrono::Duration::days(days))
}

/// Convert a calendar date to its spreadsheet serial number.
pub fn serial_from_date(date: NaiveDate) -> f64 {
    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return 0.0;
    };
    let days = (date - base).num_days();
    if days < 61 {
        (days - 1) as f64
    } else {
        days as f64
    }
}

/// Sunday-first week of year: `ceil((day_of_year + weekday_of_jan1) / 7)`,
/// where Sunday is weekday 0. Week 1 is the week containing January 1st.
pub fn week_number(date: NaiveDate) -> u32 {
    let day_of_year = date.ordinal();
    let jan1_weekday = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (day_of_year + jan1_weekday).div_ceil(7)
}
