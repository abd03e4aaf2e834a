//! Date normalization and formatting helpers

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

use crate::content::DateValue;

lazy_static! {
    static ref DAY_MONTH_YEAR: Regex = Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap();
    static ref YEAR_ONLY: Regex = Regex::new(r"^(\d{4})$").unwrap();
    static ref YEAR_MONTH: Regex = Regex::new(r"^(\d{4})-(\d{2})$").unwrap();
}

/// Formats carrying an explicit UTC offset
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// Date-times without an offset, read in the configured time zone
const NAIVE_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only forms other than ISO, read as local midnight
const DATE_FORMATS: [&str; 7] = [
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

/// Turns heterogeneous metadata dates into canonical UTC instants.
///
/// Normalization is total: anything that cannot be read as a date becomes
/// the current instant.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    timezone: Tz,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

impl DateNormalizer {
    /// Create a normalizer that reads naive dates in `timezone`
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Normalize a metadata date, falling back to the current instant
    pub fn normalize(&self, value: Option<&DateValue>) -> DateTime<Utc> {
        self.normalize_at(value, Utc::now())
    }

    /// Normalize a metadata date, falling back to `now`
    pub fn normalize_at(&self, value: Option<&DateValue>, now: DateTime<Utc>) -> DateTime<Utc> {
        match value {
            None => now,
            Some(DateValue::Instant(instant)) => *instant,
            Some(DateValue::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return now;
                }
                self.parse(text).unwrap_or_else(|| {
                    tracing::debug!("Unparseable date {:?}, using current time", text);
                    now
                })
            }
        }
    }

    /// Parse a date string, returning `None` when no known format matches.
    ///
    /// `D.M.YYYY` is always read day-first.
    pub fn parse(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();

        if let Some(caps) = DAY_MONTH_YEAR.captures(s) {
            let day: i64 = caps[1].parse().ok()?;
            let month: i64 = caps[2].parse().ok()?;
            let year: i64 = caps[3].parse().ok()?;
            let date = calendar_date(year, month, day)?;
            return self.localize(date.and_hms_opt(0, 0, 0)?);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        // ISO date-only forms are UTC
        if let Some(caps) = YEAR_ONLY.captures(s) {
            let year: i32 = caps[1].parse().ok()?;
            return utc_midnight(NaiveDate::from_ymd_opt(year, 1, 1)?);
        }
        if let Some(caps) = YEAR_MONTH.captures(s) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            return utc_midnight(NaiveDate::from_ymd_opt(year, month, 1)?);
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return utc_midnight(date);
        }

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }
        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.localize(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return self.localize(date.and_hms_opt(0, 0, 0)?);
            }
        }

        None
    }

    /// Resolve a wall-clock time in the configured zone
    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            // Skipped by a DST transition
            .or_else(|| Some(Utc.from_utc_datetime(&naive)))
    }
}

/// Build a date from possibly out-of-range fields, rolling over like a calendar
fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let months = year * 12 + (month - 1);
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::days(day - 1))
}

fn utc_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Canonical wire form of a normalized date (`2024-12-25T00:00:00.000Z`)
pub fn to_iso_string(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Tz2: TimeZone>(date: &DateTime<Tz2>, format: &str) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each category
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
