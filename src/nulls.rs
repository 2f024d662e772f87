//! NULL detection and numeric punctuation normalization.
//!
//! Spreadsheet exports spell "no value" in several ways and mix US and
//! European number punctuation. Both the inference engine and the SQL
//! generator route raw cells through this module so that a token counted as
//! NULL during inference is also rendered as `NULL` during generation.

use std::{borrow::Cow, str::FromStr};

use rust_decimal::Decimal;

/// Tokens (compared case-insensitively after trimming) that stand for SQL NULL.
pub const NULL_TOKENS: &[&str] = &["null", "n/a", "#n/a", "<null>", "(null)"];

/// Returns `true` for empty or whitespace-only values and for any of the
/// [`NULL_TOKENS`] spellings.
pub fn is_null_representation(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    NULL_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Removes `.` and `,` so that grouped integers such as `1.000` or `1,000`
/// parse as plain integers.
pub fn strip_thousands_separators(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '.' | ',')).collect()
}

/// Rewrites a European decimal (`1.234,56`) into dot-decimal form
/// (`1234.56`). Values without a comma are returned unchanged.
pub fn normalize_decimal(value: &str) -> Cow<'_, str> {
    if value.contains(',') {
        Cow::Owned(value.replace('.', "").replace(',', "."))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn has_decimal_separator(value: &str) -> bool {
    value.contains(['.', ','])
}

/// Parses a raw cell as a 64-bit integer after dropping grouping punctuation.
pub fn parse_grouped_integer(value: &str) -> Option<i64> {
    let stripped = strip_thousands_separators(value.trim());
    i64::from_str(&stripped).ok()
}

/// Parses a raw cell as a decimal using [`normalize_decimal`]. Accepts an
/// optional leading `+` and scientific notation.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = normalize_decimal(trimmed);
    let body = match normalized.strip_prefix('+') {
        Some(rest) if rest.starts_with(['+', '-']) => return None,
        Some(rest) => rest,
        None => normalized.as_ref(),
    };
    Decimal::from_str(body)
        .or_else(|_| Decimal::from_scientific(body))
        .ok()
}
