use thiserror::Error;

/// Structural failures that abort SQL generation before any text is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Table name cannot be empty")]
    EmptyTableName,
    #[error("Table name cannot exceed 128 characters (got {length})")]
    TableNameTooLong { length: usize },
    #[error("Table name contains invalid characters: '{0}'")]
    InvalidTableName(String),
    #[error("Table name is a reserved SQL keyword: '{0}'")]
    ReservedKeyword(String),
    #[error("Schema has no columns to generate")]
    NoColumns,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Row {row} has {found} value(s) but the header defines {expected} column(s)")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}
