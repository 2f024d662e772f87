//! Column, schema, and conversion result types shared by inference and generation.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{error::SchemaError, nulls::is_null_representation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Int,
    Float,
    DateTime,
    Bit,
    Text,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Int => "int",
            SqlType::Float => "float",
            SqlType::DateTime => "datetime",
            SqlType::Bit => "bit",
            SqlType::Text => "text",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["int", "float", "datetime", "bit", "text"]
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "int" | "integer" | "bigint" => Ok(SqlType::Int),
            "float" | "decimal" | "money" => Ok(SqlType::Float),
            "datetime" | "datetime2" | "date" => Ok(SqlType::DateTime),
            "bit" | "bool" | "boolean" => Ok(SqlType::Bit),
            "text" | "nvarchar" | "varchar" | "string" => Ok(SqlType::Text),
            _ => Err(anyhow!(
                "Unknown SQL type '{value}'. Supported types: {}",
                SqlType::variants().join(", ")
            )),
        }
    }
}

/// Per-column inference result. Freshly parsed columns start as nullable
/// `Text` with zero confidence until the inference engine fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTypeInfo {
    pub name: String,
    pub sql_type: SqlType,
    pub confidence_score: f64,
    pub confidence_percent: u8,
    pub reason: String,
    pub sample_value: String,
    pub allow_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub is_primary_key: bool,
}

impl ColumnTypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: SqlType::Text,
            confidence_score: 0.0,
            confidence_percent: 0,
            reason: String::new(),
            sample_value: String::new(),
            allow_null: true,
            max_length: None,
            is_primary_key: false,
        }
    }

    /// Stores `score` clamped to `[0, 1]` and keeps the percent in lockstep.
    pub fn set_confidence(&mut self, score: f64) {
        let clamped = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        self.confidence_score = clamped;
        self.confidence_percent = (clamped * 100.0).round() as u8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataSource {
    #[default]
    ClipboardTsv,
    ClipboardCsv,
    ClipboardSingle,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataSource::ClipboardTsv => "ClipboardTSV",
            DataSource::ClipboardCsv => "ClipboardCSV",
            DataSource::ClipboardSingle => "ClipboardSingle",
        };
        f.write_str(label)
    }
}

/// Column descriptors plus the raw cell matrix they describe.
///
/// Rows are immutable once the schema is built; only column metadata changes
/// afterwards (inference, then optional user overrides).
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub source: DataSource,
    pub columns: Vec<ColumnTypeInfo>,
    rows: Vec<Vec<String>>,
}

impl TableSchema {
    /// Builds a schema, rejecting any row whose width differs from the header.
    pub fn new(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        source: DataSource,
    ) -> Result<Self, SchemaError> {
        let expected = headers.len();
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
            .map(|(idx, row)| (idx, row.len()))
        {
            return Err(SchemaError::RowWidthMismatch {
                row: row + 1,
                expected,
                found,
            });
        }
        Ok(Self {
            source,
            columns: headers.into_iter().map(ColumnTypeInfo::new).collect(),
            rows,
        })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }

    /// Resolves a column by exact name, then case-insensitive name, then
    /// 1-based position.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.columns
            .iter()
            .position(|c| c.name == key)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(key))
            })
            .or_else(|| {
                key.parse::<usize>()
                    .ok()
                    .filter(|pos| (1..=self.columns.len()).contains(pos))
                    .map(|pos| pos - 1)
            })
    }

    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_primary_key)
    }

    /// Reassigns a column's type. Switching to `Text` recomputes `max_length`
    /// from the raw values so the DDL column is wide enough.
    pub fn override_type(&mut self, column: &str, sql_type: SqlType) -> Result<(), SchemaError> {
        let index = self
            .column_index(column)
            .ok_or_else(|| SchemaError::UnknownColumn(column.to_string()))?;
        let max_length = (sql_type == SqlType::Text).then(|| {
            self.column_values(index)
                .filter(|value| !is_null_representation(value))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0)
        });
        let info = &mut self.columns[index];
        info.sql_type = sql_type;
        info.max_length = max_length;
        info.reason = format!("type overridden to {sql_type}");
        Ok(())
    }

    /// Turns every column into `Text` of a fixed `length`, discarding inferred
    /// types. Row data is untouched.
    pub fn force_text(&mut self, length: usize) {
        for column in &mut self.columns {
            column.sql_type = SqlType::Text;
            column.max_length = Some(length);
            column.reason = format!("quick mode NVARCHAR({length})");
        }
    }
}

/// Outcome of one SQL generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub generated_sql: String,
    pub row_count: usize,
    pub table_name: String,
    pub schema_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub conversion_time: DateTime<Local>,
}

impl ConversionResult {
    pub fn succeeded(sql: String, row_count: usize, table_name: &str, schema_name: &str) -> Self {
        Self {
            success: true,
            generated_sql: sql,
            row_count,
            table_name: table_name.to_string(),
            schema_name: schema_name.to_string(),
            error_message: None,
            conversion_time: Local::now(),
        }
    }

    pub fn failed(message: String, row_count: usize, table_name: &str, schema_name: &str) -> Self {
        Self {
            success: false,
            generated_sql: String::new(),
            row_count,
            table_name: table_name.to_string(),
            schema_name: schema_name.to_string(),
            error_message: Some(message),
            conversion_time: Local::now(),
        }
    }

    pub fn summary(&self) -> String {
        format!("{} ({} rows)", self.table_name, self.row_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        TableSchema::new(
            vec!["ID".into(), "Name".into()],
            vec![
                vec!["1".into(), "Alice".into()],
                vec!["2".into(), "Bartholomew".into()],
                vec!["3".into(), "NULL".into()],
            ],
            DataSource::ClipboardTsv,
        )
        .expect("rectangular rows")
    }

    #[test]
    fn sql_type_tokens_parse_aliases() {
        assert_eq!("INTEGER".parse::<SqlType>().unwrap(), SqlType::Int);
        assert_eq!("money".parse::<SqlType>().unwrap(), SqlType::Float);
        assert_eq!("DateTime2".parse::<SqlType>().unwrap(), SqlType::DateTime);
        assert_eq!("boolean".parse::<SqlType>().unwrap(), SqlType::Bit);
        assert_eq!("nvarchar".parse::<SqlType>().unwrap(), SqlType::Text);
        let err = "geography".parse::<SqlType>().unwrap_err();
        assert!(err.to_string().contains("Supported types"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TableSchema::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
            DataSource::ClipboardCsv,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RowWidthMismatch {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn confidence_percent_tracks_score() {
        let mut info = ColumnTypeInfo::new("x");
        info.set_confidence(0.875);
        assert_eq!(info.confidence_percent, 88);
        info.set_confidence(1.7);
        assert_eq!(info.confidence_score, 1.0);
        assert_eq!(info.confidence_percent, 100);
    }

    #[test]
    fn column_lookup_accepts_name_case_and_position() {
        let schema = sample_schema();
        assert_eq!(schema.column_index("Name"), Some(1));
        assert_eq!(schema.column_index("name"), Some(1));
        assert_eq!(schema.column_index("1"), Some(0));
        assert_eq!(schema.column_index("3"), None);
        assert_eq!(schema.column_index("missing"), None);
    }

    #[test]
    fn override_to_text_recomputes_max_length() {
        let mut schema = sample_schema();
        schema.override_type("name", SqlType::Text).unwrap();
        assert_eq!(schema.columns[1].max_length, Some(11));
        schema.override_type("ID", SqlType::Float).unwrap();
        assert_eq!(schema.columns[0].sql_type, SqlType::Float);
        assert_eq!(schema.columns[0].max_length, None);
        assert_eq!(
            schema.override_type("nope", SqlType::Int).unwrap_err(),
            SchemaError::UnknownColumn("nope".into())
        );
    }

    #[test]
    fn force_text_sets_every_column_to_fixed_width() {
        let mut schema = sample_schema();
        schema.columns[0].sql_type = SqlType::Int;
        schema.force_text(100);
        assert!(schema.columns.iter().all(|c| c.sql_type == SqlType::Text));
        assert!(schema.columns.iter().all(|c| c.max_length == Some(100)));
        assert_eq!(schema.rows()[1][1], "Bartholomew");
    }

    #[test]
    fn data_source_labels() {
        assert_eq!(DataSource::ClipboardTsv.to_string(), "ClipboardTSV");
        assert_eq!(DataSource::ClipboardCsv.to_string(), "ClipboardCSV");
        assert_eq!(DataSource::ClipboardSingle.to_string(), "ClipboardSingle");
    }

    #[test]
    fn summary_names_table_and_rows() {
        let result = ConversionResult::succeeded(String::new(), 15, "Orders", "dbo");
        assert_eq!(result.summary(), "Orders (15 rows)");
    }
}
