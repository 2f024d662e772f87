//! Column type inference over raw spreadsheet cells.
//!
//! Every column is scanned once. NULL spellings are set aside, the remaining
//! values are tallied against each candidate detector, and the first
//! candidate in priority order whose match ratio clears its threshold wins:
//!
//! | Priority | Type     | Threshold |
//! |----------|----------|-----------|
//! | 1        | DateTime | 80 %      |
//! | 2        | Int      | 85 %      |
//! | 3        | Bit      | 90 % (only with [`InferenceOptions::detect_bit`]) |
//! | 4        | Float    | 85 %      |
//! | 5        | Text     | always    |
//!
//! Malformed values never raise errors; they simply fail to match and lower
//! the winning candidate's confidence.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    datetime::{DateFamily, DateLocale, classify_date},
    model::{ColumnTypeInfo, SqlType, TableSchema},
    nulls::{has_decimal_separator, is_null_representation, parse_decimal},
};

pub const DATETIME_THRESHOLD_PERCENT: usize = 80;
pub const INT_THRESHOLD_PERCENT: usize = 85;
pub const BIT_THRESHOLD_PERCENT: usize = 90;
pub const FLOAT_THRESHOLD_PERCENT: usize = 85;

const BIT_TOKENS: &[&str] = &["true", "false", "yes", "no", "on", "off", "1", "0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Enables Bit detection between Int and Float. Off by default so that
    /// flag-like columns keep their literal spelling unless asked otherwise.
    pub detect_bit: bool,
    /// Flags the first Int-typed or ID-named column as the primary key.
    pub detect_primary_key: bool,
    pub date_locale: DateLocale,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            detect_bit: false,
            detect_primary_key: true,
            date_locale: DateLocale::Invariant,
        }
    }
}

/// What inference decided for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInference {
    pub sql_type: SqlType,
    pub confidence_score: f64,
    pub reason: String,
    pub sample_value: String,
    pub allow_null: bool,
    pub max_length: Option<usize>,
}

impl ColumnInference {
    pub fn apply_to(self, column: &mut ColumnTypeInfo) {
        column.sql_type = self.sql_type;
        column.set_confidence(self.confidence_score);
        column.reason = self.reason;
        column.sample_value = self.sample_value;
        column.allow_null = self.allow_null;
        column.max_length = self.max_length;
        column.is_primary_key = false;
    }
}

#[derive(Debug, Clone, Default)]
struct ColumnTally {
    non_null: usize,
    date_matches: usize,
    date_family: Option<DateFamily>,
    int_matches: usize,
    bit_matches: usize,
    float_matches: usize,
    comma_decimals: usize,
}

impl ColumnTally {
    fn update(&mut self, value: &str, options: &InferenceOptions) {
        self.non_null += 1;
        if let Some(family) = classify_date(value, options.date_locale) {
            self.date_matches += 1;
            self.date_family.get_or_insert(family);
        }
        if is_integer_token(value) {
            self.int_matches += 1;
        }
        if options.detect_bit && is_bit_token(value) {
            self.bit_matches += 1;
        }
        if is_float_token(value) {
            self.float_matches += 1;
            if value.contains(',') {
                self.comma_decimals += 1;
            }
        }
    }

    fn meets(&self, matches: usize, threshold_percent: usize) -> bool {
        self.non_null > 0
            && matches.saturating_mul(100) >= self.non_null.saturating_mul(threshold_percent)
    }

    fn ratio(&self, matches: usize) -> f64 {
        if self.non_null == 0 {
            return 1.0;
        }
        matches as f64 / self.non_null as f64
    }

    fn decide(&self, options: &InferenceOptions) -> (SqlType, f64, String) {
        if self.non_null == 0 {
            return (SqlType::Text, 1.0, "all values empty or NULL".to_string());
        }
        if self.meets(self.date_matches, DATETIME_THRESHOLD_PERCENT) {
            let ratio = self.ratio(self.date_matches);
            let family = self.date_family.unwrap_or(DateFamily::LocaleFormat);
            return (
                SqlType::DateTime,
                ratio,
                format!(
                    "{}% of values match date/time patterns ({family})",
                    percent(ratio)
                ),
            );
        }
        if self.meets(self.int_matches, INT_THRESHOLD_PERCENT) {
            let ratio = self.ratio(self.int_matches);
            return (
                SqlType::Int,
                ratio,
                format!("{}% of values are valid integers", percent(ratio)),
            );
        }
        if options.detect_bit && self.meets(self.bit_matches, BIT_THRESHOLD_PERCENT) {
            let ratio = self.ratio(self.bit_matches);
            return (
                SqlType::Bit,
                ratio,
                format!(
                    "{}% of values are boolean tokens (true/false, yes/no, on/off, 1/0)",
                    percent(ratio)
                ),
            );
        }
        if self.meets(self.float_matches, FLOAT_THRESHOLD_PERCENT) {
            let ratio = self.ratio(self.float_matches);
            let convention = if self.comma_decimals * 2 > self.float_matches {
                "decimal comma"
            } else {
                "decimal point"
            };
            return (
                SqlType::Float,
                ratio,
                format!(
                    "{}% of values are decimal numbers ({convention})",
                    percent(ratio)
                ),
            );
        }
        (SqlType::Text, 1.0, "no pattern matched".to_string())
    }
}

fn percent(ratio: f64) -> u8 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Integers must be free of `.`/`,` and must not be zero-padded (`0001`
/// stays text so formatted codes survive).
pub fn is_integer_token(value: &str) -> bool {
    let trimmed = value.trim();
    if has_decimal_separator(trimmed) {
        return false;
    }
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let mut chars = digits.chars();
    if chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    trimmed.parse::<i64>().is_ok()
}

/// Decimals must parse after normalization and either carry a separator or
/// have a fractional part, so plain integers are not double-counted.
pub fn is_float_token(value: &str) -> bool {
    let trimmed = value.trim();
    parse_decimal(trimmed)
        .is_some_and(|decimal| has_decimal_separator(trimmed) || !decimal.fract().is_zero())
}

pub fn is_bit_token(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    BIT_TOKENS.contains(&lowered.as_str())
}

/// Infers a single column from its raw values.
pub fn infer_column<'a, I>(values: I, options: &InferenceOptions) -> ColumnInference
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tally = ColumnTally::default();
    let mut allow_null = false;
    let mut first_raw: Option<&str> = None;
    let mut first_non_null: Option<&str> = None;
    let mut max_length = 0usize;

    for value in values {
        first_raw.get_or_insert(value);
        if is_null_representation(value) {
            allow_null = true;
            continue;
        }
        first_non_null.get_or_insert(value);
        max_length = max_length.max(value.chars().count());
        tally.update(value, options);
    }

    let (sql_type, confidence_score, reason) = tally.decide(options);
    ColumnInference {
        sql_type,
        confidence_score,
        reason,
        sample_value: first_non_null.or(first_raw).unwrap_or_default().to_string(),
        allow_null,
        max_length: (sql_type == SqlType::Text).then_some(max_length),
    }
}

/// Infers every column of `schema` in place.
pub fn infer_types(schema: &mut TableSchema, options: &InferenceOptions) {
    let inferred = (0..schema.column_count())
        .map(|idx| infer_column(schema.column_values(idx), options))
        .collect::<Vec<_>>();

    for (column, inference) in schema.columns.iter_mut().zip(inferred) {
        inference.apply_to(column);
        debug!(
            "Column '{}' inferred as {} ({}%): {}",
            column.name, column.sql_type, column.confidence_percent, column.reason
        );
    }

    if options.detect_primary_key
        && let Some(idx) = mark_primary_key(&mut schema.columns)
    {
        debug!("Column '{}' flagged as primary key", schema.columns[idx].name);
    }
}

/// Flags the first column that is Int-typed or whose name contains `ID`
/// (case-insensitive) as the primary key and makes it non-nullable.
pub fn mark_primary_key(columns: &mut [ColumnTypeInfo]) -> Option<usize> {
    for column in columns.iter_mut() {
        column.is_primary_key = false;
    }
    let idx = columns.iter().position(|column| {
        column.sql_type == SqlType::Int || column.name.to_uppercase().contains("ID")
    })?;
    columns[idx].is_primary_key = true;
    columns[idx].allow_null = false;
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[&str]) -> ColumnInference {
        infer_column(values.iter().copied(), &InferenceOptions::default())
    }

    fn infer_with_bit(values: &[&str]) -> ColumnInference {
        let options = InferenceOptions {
            detect_bit: true,
            ..InferenceOptions::default()
        };
        infer_column(values.iter().copied(), &options)
    }

    #[test]
    fn integer_tokens_reject_separators_and_zero_padding() {
        assert!(is_integer_token("42"));
        assert!(is_integer_token("-7"));
        assert!(is_integer_token("0"));
        assert!(is_integer_token(" 100 "));
        assert!(!is_integer_token("0001"));
        assert!(!is_integer_token("-05"));
        assert!(!is_integer_token("1,000"));
        assert!(!is_integer_token("1.5"));
        assert!(!is_integer_token("99999999999999999999"));
    }

    #[test]
    fn float_tokens_require_separator_or_fraction() {
        assert!(is_float_token("19.99"));
        assert!(is_float_token("0,0673"));
        assert!(is_float_token("100,00"));
        assert!(!is_float_token("12"));
        assert!(!is_float_token("abc"));
    }

    #[test]
    fn empty_column_is_text_with_full_confidence() {
        let result = infer(&["", " ", "NULL"]);
        assert_eq!(result.sql_type, SqlType::Text);
        assert_eq!(result.confidence_score, 1.0);
        assert_eq!(result.reason, "all values empty or NULL");
        assert!(result.allow_null);
        assert_eq!(result.max_length, Some(0));
        assert_eq!(result.sample_value, "");
    }

    #[test]
    fn integer_column_reports_match_ratio() {
        let result = infer(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "TEXT"]);
        assert_eq!(result.sql_type, SqlType::Int);
        assert!((result.confidence_score - 0.9).abs() < f64::EPSILON);
        assert_eq!(result.reason, "90% of values are valid integers");
        assert_eq!(result.max_length, None);
    }

    #[test]
    fn datetime_wins_before_numbers() {
        let result = infer(&["2026-02-06", "2026-02-05", "2026-02-04"]);
        assert_eq!(result.sql_type, SqlType::DateTime);
        assert!(result.reason.contains("ISO 8601"));
    }

    #[test]
    fn bit_detection_only_when_enabled() {
        let values = ["true", "false", "true", "false"];
        assert_eq!(infer(&values).sql_type, SqlType::Text);
        let with_bit = infer_with_bit(&values);
        assert_eq!(with_bit.sql_type, SqlType::Bit);
        assert_eq!(with_bit.confidence_score, 1.0);
    }

    #[test]
    fn bare_zero_one_columns_stay_integers() {
        assert_eq!(infer_with_bit(&["0", "1", "1", "0"]).sql_type, SqlType::Int);
    }

    #[test]
    fn european_float_reason_names_decimal_comma() {
        let result = infer(&["0,00", "100,00", "4,5426"]);
        assert_eq!(result.sql_type, SqlType::Float);
        assert_eq!(result.reason, "100% of values are decimal numbers (decimal comma)");
    }

    #[test]
    fn sample_prefers_first_non_null_value() {
        let result = infer(&["", "NULL", "abc", "de"]);
        assert_eq!(result.sample_value, "abc");
        assert_eq!(result.max_length, Some(3));
    }

    #[test]
    fn primary_key_is_first_int_or_id_column() {
        let mut columns = vec![
            ColumnTypeInfo::new("Name"),
            ColumnTypeInfo::new("OrderId"),
            ColumnTypeInfo::new("Qty"),
        ];
        columns[2].sql_type = SqlType::Int;
        assert_eq!(mark_primary_key(&mut columns), Some(1));
        assert!(columns[1].is_primary_key);
        assert!(!columns[1].allow_null);
        assert!(!columns[2].is_primary_key);

        let mut none = vec![ColumnTypeInfo::new("Label")];
        assert_eq!(mark_primary_key(&mut none), None);
    }
}
