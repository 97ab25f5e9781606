//! Lenient parsing of `sale_date` values.
//!
//! Sales exports are not consistent about timestamps: SQLite's
//! `CURRENT_TIMESTAMP` writes `YYYY-MM-DD HH:MM:SS`, hand-entered rows are
//! often just a date, and anything that went through a JSON API tends to be
//! RFC 3339 with a `Z`. We accept a fixed, ordered set of encodings and
//! report anything else as unparseable (the caller skips the row).

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::SaleDate;

/// ISO 8601 date-times carrying an explicit UTC offset.
const ISO_OFFSET_FMTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// ISO 8601 local date-times (optional fractional seconds).
const ISO_LOCAL_FMTS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Fallback patterns, tried in order after the ISO forms.
const FALLBACK_DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const FALLBACK_DATE_FMT: &str = "%Y-%m-%d";

/// Parse a sale date into a local date-time.
///
/// Offsets are dropped, not converted: a sale stamped `23:30-05:00` belongs to
/// the day it was rung up on, not the next UTC day.
pub fn parse_sale_date(value: SaleDate<'_>) -> Option<NaiveDateTime> {
    match value {
        SaleDate::DateTime(dt) => Some(dt),
        SaleDate::Date(d) => d.and_hms_opt(0, 0, 0),
        SaleDate::Text(s) => parse_sale_date_str(s),
    }
}

/// Calendar day of a sale date, if it parses.
pub fn sale_day(value: SaleDate<'_>) -> Option<NaiveDate> {
    parse_sale_date(value).map(|dt| dt.date())
}

fn parse_sale_date_str(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // `Z` is shorthand for `+00:00`; chrono's `%:z` only accepts the long form.
    let with_offset = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .map(|base| format!("{base}+00:00"));
    let iso = with_offset.as_deref().unwrap_or(s);

    for fmt in ISO_OFFSET_FMTS {
        if let Ok(dt) = DateTime::parse_from_str(iso, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in ISO_LOCAL_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Some(dt) = parse_hour_only(s) {
        return Some(dt);
    }
    for fmt in FALLBACK_DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, FALLBACK_DATE_FMT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Reduced-precision ISO form `YYYY-MM-DDTHH` (or with a space).
///
/// chrono's parser insists on minutes, so this one is split by hand.
fn parse_hour_only(s: &str) -> Option<NaiveDateTime> {
    let (date, hour) = s.split_once(['T', ' '])?;
    if hour.len() != 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    NaiveDate::parse_from_str(date, FALLBACK_DATE_FMT)
        .ok()?
        .and_hms_opt(hour, 0, 0)
}
