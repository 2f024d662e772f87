//! T-SQL script generation: one `CREATE TABLE` followed by batched
//! `INSERT ... VALUES` statements.
//!
//! Structural problems (bad table name, no columns) abort generation and
//! produce a failed [`ConversionResult`]. Individual values that do not parse
//! as their column's type are emitted as `NULL` instead.

use std::{borrow::Cow, sync::LazyLock};

use itertools::Itertools;
use log::{debug, info, warn};
use regex::Regex;

use crate::{
    datetime::{DateLocale, format_datetime2, parse_datetime},
    error::GenerateError,
    model::{ColumnTypeInfo, ConversionResult, SqlType, TableSchema},
    nulls::{is_null_representation, parse_decimal, parse_grouped_integer},
};

/// SQL Server accepts at most 1000 row constructors per `VALUES` clause.
pub const INSERT_BATCH_SIZE: usize = 1000;
pub const MAX_TABLE_NAME_LENGTH: usize = 128;
pub const DEFAULT_SCHEMA: &str = "dbo";
pub const TEMPORAL_SUFFIX: &str = "_Temporal";
pub const HISTORY_SUFFIX: &str = "_History";

const DEFAULT_NVARCHAR_LENGTH: usize = 255;
const MAX_NVARCHAR_LENGTH: usize = 4000;

const RESERVED_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "TABLE", "DATABASE", "VIEW",
];

static TABLE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_@#][A-Za-z0-9_@#]*$").expect("table name pattern compiles")
});

const BIT_TRUE: &[&str] = &["true", "yes", "1", "on", "t", "y"];
const BIT_FALSE: &[&str] = &["false", "no", "0", "off", "f", "n"];

/// Placement and rendering switches for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub table_name: String,
    pub schema_name: String,
    /// Adds period columns and enables system versioning.
    pub temporal: bool,
    /// Session-scoped `#` table; the schema name is ignored.
    pub temporary: bool,
    /// Appends `_Temporal` to the table name when `temporal` is also set.
    pub append_temporal_suffix: bool,
    /// Renders an Int primary key as `IDENTITY` and leaves it out of INSERTs.
    pub identity_primary_key: bool,
    pub date_locale: DateLocale,
}

impl GenerateOptions {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            schema_name: DEFAULT_SCHEMA.to_string(),
            temporal: false,
            temporary: false,
            append_temporal_suffix: false,
            identity_primary_key: false,
            date_locale: DateLocale::Invariant,
        }
    }

    fn effective_schema(&self) -> &str {
        let trimmed = self.schema_name.trim();
        if trimmed.is_empty() { DEFAULT_SCHEMA } else { trimmed }
    }

    fn qualify(&self, name: &str) -> String {
        if self.temporary {
            quote_identifier(&format!("#{name}"))
        } else {
            format!(
                "{}.{}",
                quote_identifier(self.effective_schema()),
                quote_identifier(name)
            )
        }
    }

    /// Fully qualified target table, suffix included.
    pub fn target_table(&self) -> String {
        if self.temporal && self.append_temporal_suffix {
            self.qualify(&format!("{}{TEMPORAL_SUFFIX}", self.table_name))
        } else {
            self.qualify(&self.table_name)
        }
    }

    pub fn history_table(&self) -> String {
        self.qualify(&format!("{}{HISTORY_SUFFIX}", self.table_name))
    }
}

/// DDL type and value formatter for one [`SqlType`].
struct TypeMapping {
    ddl: fn(Option<usize>) -> Cow<'static, str>,
    format: fn(&str, DateLocale) -> Option<String>,
}

fn type_mapping(sql_type: SqlType) -> TypeMapping {
    match sql_type {
        SqlType::Int => TypeMapping {
            ddl: |_| Cow::Borrowed("INT"),
            format: |value, _| parse_grouped_integer(value).map(|n| n.to_string()),
        },
        SqlType::Float => TypeMapping {
            ddl: |_| Cow::Borrowed("DECIMAL(18,4)"),
            format: |value, _| parse_decimal(value).map(|d| d.to_string()),
        },
        SqlType::DateTime => TypeMapping {
            ddl: |_| Cow::Borrowed("DATETIME2(7)"),
            format: |value, locale| parse_datetime(value, locale).map(|dt| format_datetime2(&dt)),
        },
        SqlType::Bit => TypeMapping {
            ddl: |_| Cow::Borrowed("BIT"),
            format: format_bit,
        },
        SqlType::Text => TypeMapping {
            ddl: nvarchar,
            format: |value, _| Some(quote_literal(value)),
        },
    }
}

fn nvarchar(max_length: Option<usize>) -> Cow<'static, str> {
    match max_length {
        Some(length) if length > MAX_NVARCHAR_LENGTH => Cow::Borrowed("NVARCHAR(MAX)"),
        Some(length) if length > 0 => Cow::Owned(format!("NVARCHAR({length})")),
        _ => Cow::Owned(format!("NVARCHAR({DEFAULT_NVARCHAR_LENGTH})")),
    }
}

fn format_bit(value: &str, _: DateLocale) -> Option<String> {
    let token = value
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase();
    if BIT_TRUE.contains(&token.as_str()) {
        Some("1".to_string())
    } else if BIT_FALSE.contains(&token.as_str()) {
        Some("0".to_string())
    } else {
        None
    }
}

/// Wraps `name` in brackets, doubling any closing bracket.
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Wraps `value` in single quotes, doubling any embedded quote.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders one cell as a SQL literal for a column of `sql_type`.
pub fn format_value(value: &str, sql_type: SqlType, locale: DateLocale) -> String {
    if is_null_representation(value) {
        return "NULL".to_string();
    }
    (type_mapping(sql_type).format)(value, locale).unwrap_or_else(|| "NULL".to_string())
}

pub fn validate_table_name(name: &str) -> Result<(), GenerateError> {
    if name.trim().is_empty() {
        return Err(GenerateError::EmptyTableName);
    }
    let length = name.chars().count();
    if length > MAX_TABLE_NAME_LENGTH {
        return Err(GenerateError::TableNameTooLong { length });
    }
    if !TABLE_NAME_PATTERN.is_match(name) {
        return Err(GenerateError::InvalidTableName(name.to_string()));
    }
    if RESERVED_KEYWORDS
        .iter()
        .any(|keyword| name.eq_ignore_ascii_case(keyword))
    {
        return Err(GenerateError::ReservedKeyword(name.to_string()));
    }
    Ok(())
}

fn is_identity_column(column: &ColumnTypeInfo, options: &GenerateOptions) -> bool {
    options.identity_primary_key && column.is_primary_key && column.sql_type == SqlType::Int
}

fn column_definition(column: &ColumnTypeInfo, options: &GenerateOptions) -> String {
    let name = quote_identifier(&column.name);
    if is_identity_column(column, options) {
        return format!("{name} INT IDENTITY(1,1) NOT NULL PRIMARY KEY");
    }
    let ddl = (type_mapping(column.sql_type).ddl)(column.max_length);
    format!("{name} {ddl} NULL")
}

pub fn create_table_statement(schema: &TableSchema, options: &GenerateOptions) -> String {
    let mut lines = schema
        .columns
        .iter()
        .map(|column| format!("    {}", column_definition(column, options)))
        .collect::<Vec<_>>();
    if options.temporal {
        lines.push("    SysStartTime DATETIME2 GENERATED ALWAYS AS ROW START NOT NULL".to_string());
        lines.push("    SysEndTime DATETIME2 GENERATED ALWAYS AS ROW END NOT NULL".to_string());
        lines.push("    PERIOD FOR SYSTEM_TIME (SysStartTime, SysEndTime)".to_string());
    }

    let mut sql = format!(
        "CREATE TABLE {}\n(\n{}\n)",
        options.target_table(),
        lines.join(",\n")
    );
    if options.temporal {
        sql.push_str(&format!(
            "\nWITH (SYSTEM_VERSIONING = ON (HISTORY_TABLE = {}, DATA_CONSISTENCY_CHECK = ON));",
            options.history_table()
        ));
    } else {
        sql.push(';');
    }
    sql
}

/// Returns one `INSERT` statement per batch of [`INSERT_BATCH_SIZE`] rows.
/// A table whose only column is the identity key gets `DEFAULT VALUES` rows.
pub fn insert_statements(schema: &TableSchema, options: &GenerateOptions) -> Vec<String> {
    let included = schema
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| !is_identity_column(column, options))
        .map(|(idx, column)| (idx, column.sql_type))
        .collect::<Vec<_>>();
    let target = options.target_table();
    if included.is_empty() {
        if !schema.rows().is_empty() {
            warn!(
                "{target} has only an identity column; inserting {} row(s) with DEFAULT VALUES",
                schema.row_count()
            );
        }
        return schema
            .rows()
            .chunks(INSERT_BATCH_SIZE)
            .map(|batch| {
                batch
                    .iter()
                    .map(|_| format!("INSERT INTO {target} DEFAULT VALUES;"))
                    .join("\n")
            })
            .collect();
    }

    let column_list = included
        .iter()
        .map(|&(idx, _)| quote_identifier(&schema.columns[idx].name))
        .join(", ");
    debug!("INSERT column list: {column_list}");

    schema
        .rows()
        .chunks(INSERT_BATCH_SIZE)
        .map(|batch| {
            let tuples = batch
                .iter()
                .map(|row| {
                    let values = included
                        .iter()
                        .map(|&(idx, sql_type)| {
                            format_value(&row[idx], sql_type, options.date_locale)
                        })
                        .join(", ");
                    format!("({values})")
                })
                .join(", ");
            format!("INSERT INTO {target} ({column_list}) VALUES {tuples};")
        })
        .collect()
}

fn render(schema: &TableSchema, options: &GenerateOptions) -> Result<String, GenerateError> {
    validate_table_name(&options.table_name)?;
    if schema.columns.is_empty() {
        return Err(GenerateError::NoColumns);
    }
    let ddl = create_table_statement(schema, options);
    let inserts = insert_statements(schema, options);
    info!(
        "Generated {} with {} row(s) in {} INSERT statement(s)",
        options.target_table(),
        schema.row_count(),
        inserts.len()
    );
    Ok(std::iter::once(ddl).chain(inserts).join("\n\n"))
}

/// Generates the full script for `schema`. Never panics on bad input; any
/// structural failure is reported through the returned result.
pub fn generate_sql(schema: &TableSchema, options: &GenerateOptions) -> ConversionResult {
    let schema_name = options.effective_schema();
    match render(schema, options) {
        Ok(sql) => ConversionResult::succeeded(
            sql,
            schema.row_count(),
            &options.table_name,
            schema_name,
        ),
        Err(err) => {
            warn!("SQL generation for '{}' failed: {err}", options.table_name);
            ConversionResult::failed(
                err.to_string(),
                schema.row_count(),
                &options.table_name,
                schema_name,
            )
        }
    }
}
