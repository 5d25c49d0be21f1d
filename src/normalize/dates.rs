use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Spreadsheet serial dates count days from this epoch.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial values below 1950 resolve to dates partner templates use as
/// "not set" placeholders; anything earlier than this year is treated as
/// corrupted and replaced with the current date.
const MIN_PLAUSIBLE_YEAR: i32 = 1950;

/// Verbose partner date strings: "Sept. 18, 2025, 9:40 a.m." — only the
/// month/day/year segment before the trailing comma matters.
static VERBOSE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})").expect("invalid date regex")
});

const DATETIME_OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%:z"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];


/// Parses a date out of whatever a partner file put in the cell: ISO-8601
/// with or without time and zone offset, DD-MM-YYYY and slash variants,
/// verbose strings with abbreviated month names, or a spreadsheet serial
/// number. Returns `None` on total failure rather than raising, so one bad
/// field never aborts header construction.
pub fn parse_flexible(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("n/a") {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Some(date) = parse_numeric_date(raw) {
        return Some(date);
    }

    if let Some(caps) = VERBOSE_DATE.captures(raw) {
        let month = month_from_name(&caps[1]);
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(month) = month {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    if let Ok(serial) = raw.parse::<f64>() {
        return from_serial(serial);
    }

    None
}

/// Dash/slash dates. The token widths decide the layout: a 4-digit first
/// token is year-first, a 2-digit trailing token is a 2-digit year.
/// chrono's `%Y` happily accepts 2-digit years, so format strings alone
/// cannot disambiguate "17-09-25" from "2025-09-17".
fn parse_numeric_date(raw: &str) -> Option<NaiveDate> {
    let sep = if raw.contains('-') {
        '-'
    } else if raw.contains('/') {
        '/'
    } else {
        return None;
    };
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }

    if parts[0].len() == 4 {
        let fmt = format!("%Y{0}%m{0}%d", sep);
        return NaiveDate::parse_from_str(raw, &fmt).ok();
    }

    let year = if parts[2].len() == 2 { "%y" } else { "%Y" };
    let day_first = format!("%d{0}%m{0}{1}", sep, year);
    let month_first = format!("%m{0}%d{0}{1}", sep, year);
    NaiveDate::parse_from_str(raw, &day_first)
        .or_else(|_| NaiveDate::parse_from_str(raw, &month_first))
        .ok()
}

/// Converts a spreadsheet serial-date number (days since 1899-12-30) to a
/// calendar date. A serial resolving to a year before 1950 is a corrupted
/// placeholder and is replaced with the current date.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..100_000.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(SERIAL_EPOCH.0, SERIAL_EPOCH.1, SERIAL_EPOCH.2)?;
    let date = epoch.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    if date.year() < MIN_PLAUSIBLE_YEAR {
        return Some(today());
    }
    Some(date)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|idx| idx as u32 + 1)
}
