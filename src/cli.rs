use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{datetime::DateLocale, model::SqlType};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Turn pasted spreadsheet data into SQL Server CREATE TABLE and INSERT scripts",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column types and generate a CREATE TABLE + INSERT script
    Convert(ConvertArgs),
    /// Show the inferred schema without generating SQL
    Probe(ProbeArgs),
}

/// Input and inference flags shared by every command.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Tab- or comma-separated text file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Treat the first line as data and name columns Col1..ColN
    #[arg(long = "no-headers")]
    pub no_headers: bool,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Enable Bit detection for true/false, yes/no, on/off columns
    #[arg(long = "detect-bit")]
    pub detect_bit: bool,
    /// Do not flag a primary-key column
    #[arg(long = "no-primary-key")]
    pub no_primary_key: bool,
    /// Fallback date order tried after the invariant month-first formats
    #[arg(long = "date-locale", value_enum)]
    pub date_locale: Option<DateLocale>,
    /// Override an inferred type, e.g. `--type ZipCode=text` (repeatable)
    #[arg(long = "type", value_parser = parse_type_override, action = clap::ArgAction::Append)]
    pub type_overrides: Vec<(String, SqlType)>,
    /// YAML settings file supplying defaults
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Target table name
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Output SQL file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// SQL schema for the table (defaults to the configured schema, `dbo`)
    #[arg(long = "schema")]
    pub schema: Option<String>,
    /// Create a system-versioned temporal table with a history table
    #[arg(long = "temporal")]
    pub temporal: bool,
    /// Create a session-scoped `#` temporary table
    #[arg(long = "temporary")]
    pub temporary: bool,
    /// Append `_Temporal` to the table name of temporal tables
    #[arg(long = "temporal-suffix")]
    pub temporal_suffix: bool,
    /// Render an Int primary key as IDENTITY and leave it out of INSERTs
    #[arg(long = "identity-pk")]
    pub identity_pk: bool,
    /// Skip typing: every column NVARCHAR(100) in a `#` temporary table
    #[arg(long = "quick")]
    pub quick: bool,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Report format
    #[arg(long = "format", value_enum, default_value_t = ProbeFormat::Table)]
    pub format: ProbeFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeFormat {
    Table,
    Json,
}

/// Parses `column=type` for `--type`.
pub fn parse_type_override(value: &str) -> Result<(String, SqlType), String> {
    let (column, sql_type) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected column=type but got '{value}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("Missing column name in '{value}'"));
    }
    let sql_type = sql_type.parse::<SqlType>().map_err(|err| err.to_string())?;
    Ok((column.to_string(), sql_type))
}
