//! Date/time recognition and DATETIME2 literal rendering.
//!
//! Parsing never consults process-wide locale state. Callers pass a
//! [`DateLocale`]; the invariant (month-first) formats are always tried first
//! and the locale-specific formats second, mirroring how spreadsheet
//! applications fall back from the invariant culture to the user's culture.

use std::{fmt, sync::LazyLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use clap::ValueEnum;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    /// Month-first numeric dates (`M/D/YYYY`); only the invariant format set is used.
    #[default]
    Invariant,
    /// Day-first numeric dates (`D/M/YYYY`, `D.M.YYYY`) tried after the invariant set.
    European,
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateLocale::Invariant => write!(f, "invariant"),
            DateLocale::European => write!(f, "european"),
        }
    }
}

/// Pattern family a date value was recognised by; used in inference reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFamily {
    Iso8601,
    NumericSlash,
    MonthName,
    WeekdayPrefixed,
    LocaleFormat,
}

impl fmt::Display for DateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DateFamily::Iso8601 => "ISO 8601",
            DateFamily::NumericSlash => "numeric M/D/YYYY or D/M/YYYY",
            DateFamily::MonthName => "month-name",
            DateFamily::WeekdayPrefixed => "weekday-prefixed",
            DateFamily::LocaleFormat => "locale date format",
        };
        f.write_str(label)
    }
}

const INVARIANT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M:%S",
    "%A, %B %d, %Y %H:%M:%S",
];

const INVARIANT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%A, %B %d, %Y",
    "%A, %d %B %Y",
    "%a, %d %b %Y",
];

const EUROPEAN_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

const EUROPEAN_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

const WEEKDAYS: &str =
    "mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?";

/// Optional trailing time of day with AM/PM and zone.
const TIME_SUFFIX: &str = r"(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:\s*[AaPp][Mm])?(?:\s*(?:Z|[+-]\d{2}:?\d{2}|GMT|UTC))?)?";

// Order matches `PATTERN_FAMILIES`. Every entry is anchored on both ends.
static DATE_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    let month_day = format!(r"(?:{MONTHS})\.?\s+\d{{1,2}}");
    let day_month = format!(r"\d{{1,2}}[\s-](?:{MONTHS})\.?");
    RegexSet::new([
        format!(r"^\d{{4}}-\d{{1,2}}-\d{{1,2}}{TIME_SUFFIX}$"),
        format!(r"^\d{{1,2}}/\d{{1,2}}/\d{{4}}{TIME_SUFFIX}$"),
        format!(r"(?i)^{month_day},?\s+\d{{4}}{TIME_SUFFIX}$"),
        format!(r"(?i)^{day_month},?[\s-]\d{{4}}{TIME_SUFFIX}$"),
        format!(r"(?i)^(?:{WEEKDAYS})\.?,?\s+(?:{month_day}|{day_month}),?\s+\d{{4}}{TIME_SUFFIX}$"),
    ])
    .expect("date pattern set compiles")
});

const PATTERN_FAMILIES: [DateFamily; 5] = [
    DateFamily::Iso8601,
    DateFamily::NumericSlash,
    DateFamily::MonthName,
    DateFamily::MonthName,
    DateFamily::WeekdayPrefixed,
];

/// Parses a cell as a timestamp, trying the invariant formats first and then
/// the formats of `locale`. Date-only values resolve to midnight.
pub fn parse_datetime(value: &str, locale: DateLocale) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_with_formats(trimmed, INVARIANT_DATETIME_FORMATS, INVARIANT_DATE_FORMATS)
        .or_else(|| parse_with_offset(trimmed))
        .or_else(|| match locale {
            DateLocale::Invariant => None,
            DateLocale::European => {
                parse_with_formats(trimmed, EUROPEAN_DATETIME_FORMATS, EUROPEAN_DATE_FORMATS)
            }
        })
}

fn parse_with_formats(
    value: &str,
    datetime_formats: &[&str],
    date_formats: &[&str],
) -> Option<NaiveDateTime> {
    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_with_offset(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.naive_local())
        .ok()
}

/// Returns the first date pattern family `value` matches, if any.
pub fn match_date_pattern(value: &str) -> Option<DateFamily> {
    DATE_PATTERNS
        .matches(value.trim())
        .iter()
        .next()
        .map(|idx| PATTERN_FAMILIES[idx])
}

/// A value counts as a date only when it parses under `locale`, so every
/// counted value also renders as a DATETIME2 literal. The pattern set names
/// the family for inference reasons.
pub fn classify_date(value: &str, locale: DateLocale) -> Option<DateFamily> {
    parse_datetime(value, locale)?;
    Some(match_date_pattern(value).unwrap_or(DateFamily::LocaleFormat))
}

/// Renders a DATETIME2(7) literal: `'yyyy-MM-dd HH:mm:ss.fffffff'`.
pub fn format_datetime2(value: &NaiveDateTime) -> String {
    let ticks = (value.nanosecond() % 1_000_000_000) / 100;
    format!("'{}.{ticks:07}'", value.format("%Y-%m-%d %H:%M:%S"))
}
