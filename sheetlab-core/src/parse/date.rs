//! Date cell parsing across the formats seen in exchange exports.
//!
//! Formats are tried most-specific first (4-digit years before 2-digit).
//! A structural match is decoded with a 3-letter month table and validated
//! as a real calendar date within ±50 years of today; validity never depends
//! on which format matched, and the confidence for any structural match is a
//! flat 0.8. The matched format is recorded for diagnostics only.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Structural format that matched a date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateFormat {
    /// `11-Jul-2025`
    DayMonYear4,
    /// `2025-07-11`
    IsoYmd,
    /// `11/07/2025`
    DayMonthYearSlash,
    /// `07/11/2025`
    MonthDayYearSlash,
    /// `11-Jul-25`
    DayMonYear2,
    /// Spreadsheet serial day number.
    ExcelSerial,
    /// Matched only by the generic fallback.
    Generic,
}

/// Result of parsing one date cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub valid: bool,
    pub confidence: f64,
    pub format: Option<DateFormat>,
}

const CONF_STRUCTURAL: f64 = 0.8;
const CONF_GENERIC: f64 = 0.4;

/// Window around the current year outside which a parsed year is rejected
/// as a placeholder or garbage value.
const YEAR_WINDOW: i32 = 50;

/// Excel serial day range accepted as a date (roughly 1954-2173).
const SERIAL_MIN: f64 = 20_000.0;
const SERIAL_MAX: f64 = 100_000.0;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a raw date cell. Total: failures return today's date, invalid, at
/// confidence 0.
pub fn parse_date(cell: &crate::domain::RawCell) -> ParsedDate {
    use crate::domain::RawCell;

    let today = chrono::Local::now().date_naive();
    let fail = ParsedDate {
        date: today,
        valid: false,
        confidence: 0.0,
        format: None,
    };

    match cell {
        RawCell::Empty => fail,
        RawCell::Number(n) => {
            // Workbook date cells arrive as serial day numbers.
            if (SERIAL_MIN..SERIAL_MAX).contains(n) {
                if let Some(date) = from_excel_serial(*n) {
                    if year_plausible(date, today) {
                        return ParsedDate {
                            date,
                            valid: true,
                            confidence: CONF_STRUCTURAL,
                            format: Some(DateFormat::ExcelSerial),
                        };
                    }
                }
            }
            fail
        }
        RawCell::Text(s) => parse_text(s.trim(), today).unwrap_or(fail),
    }
}

fn parse_text(s: &str, today: NaiveDate) -> Option<ParsedDate> {
    let attempts: [(DateFormat, fn(&str) -> Option<NaiveDate>); 5] = [
        (DateFormat::DayMonYear4, |s| dmy_month_name(s, false)),
        (DateFormat::IsoYmd, iso_ymd),
        (DateFormat::DayMonthYearSlash, |s| slash_numeric(s, true)),
        (DateFormat::MonthDayYearSlash, |s| slash_numeric(s, false)),
        (DateFormat::DayMonYear2, |s| dmy_month_name(s, true)),
    ];

    for (format, decode) in attempts {
        if let Some(date) = decode(s) {
            if year_plausible(date, today) {
                return Some(ParsedDate {
                    date,
                    valid: true,
                    confidence: CONF_STRUCTURAL,
                    format: Some(format),
                });
            }
        }
    }

    // Generic fallback: a handful of chrono format strings.
    for fmt in ["%Y/%m/%d", "%d %b %Y", "%b %d, %Y", "%d.%m.%Y", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if year_plausible(date, today) {
                return Some(ParsedDate {
                    date,
                    valid: true,
                    confidence: CONF_GENERIC,
                    format: Some(DateFormat::Generic),
                });
            }
        }
    }

    None
}

/// `DD-MMM-YYYY` or `DD-MMM-YY` depending on `two_digit_year`.
fn dmy_month_name(s: &str, two_digit_year: bool) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = numeric_field(parts[0], 1, 2)?;
    let month = month_from_name(parts[1])?;
    let year = if two_digit_year {
        let yy: i32 = numeric_field(parts[2], 2, 2)?;
        expand_two_digit_year(yy)
    } else {
        numeric_field(parts[2], 4, 4)?
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY-MM-DD`.
fn iso_ymd(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year: i32 = numeric_field(parts[0], 4, 4)?;
    let month: u32 = numeric_field(parts[1], 1, 2)?;
    let day: u32 = numeric_field(parts[2], 1, 2)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `DD/MM/YYYY` (day_first) or `MM/DD/YYYY`. The day-first attempt runs
/// earlier in the trial chain, so `07/25/2025` only decodes month-first
/// because month 25 fails calendar validation.
fn slash_numeric(s: &str, day_first: bool) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let a: u32 = numeric_field(parts[0], 1, 2)?;
    let b: u32 = numeric_field(parts[1], 1, 2)?;
    let year: i32 = numeric_field(parts[2], 4, 4)?;
    let (day, month) = if day_first { (a, b) } else { (b, a) };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn numeric_field<T: std::str::FromStr>(s: &str, min_len: usize, max_len: usize) -> Option<T> {
    if s.len() < min_len || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn month_from_name(s: &str) -> Option<u32> {
    if s.len() != 3 {
        return None;
    }
    let lower = s.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

/// Y2K heuristic: two-digit years below 50 land in the 2000s.
fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < 50 {
        2000 + yy
    } else {
        1900 + yy
    }
}

fn year_plausible(date: NaiveDate, today: NaiveDate) -> bool {
    (date.year() - today.year()).abs() <= YEAR_WINDOW
}

/// Excel serial day numbers count from 1899-12-30.
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(chrono::Days::new(serial.trunc() as u64))
}

/// Advisory diagnostics from a batch of parsed dates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateDiagnostics {
    /// Adjacent gaps exceeding 7 calendar days, as (from, to, days).
    pub gaps: Vec<(NaiveDate, NaiveDate, i64)>,
    /// Count of dates parsed below confidence 0.5.
    pub low_confidence: usize,
}

const GAP_DAYS: i64 = 7;
const LOW_CONFIDENCE: f64 = 0.5;

/// Inspect a batch of parsed dates for gaps and weak parses. Advisory only.
pub fn batch_validate(dates: &[ParsedDate]) -> DateDiagnostics {
    let low_confidence = dates.iter().filter(|d| d.confidence < LOW_CONFIDENCE).count();

    let mut valid: Vec<NaiveDate> = dates.iter().filter(|d| d.valid).map(|d| d.date).collect();
    valid.sort();

    let gaps = valid
        .windows(2)
        .filter_map(|w| {
            let days = (w[1] - w[0]).num_days();
            (days > GAP_DAYS).then_some((w[0], w[1], days))
        })
        .collect();

    DateDiagnostics {
        gaps,
        low_confidence,
    }
}
