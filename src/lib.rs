pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod generator;
pub mod inference;
pub mod io_utils;
pub mod model;
pub mod nulls;
pub mod parser;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, ConvertArgs, InputArgs, ProbeArgs, ProbeFormat},
    config::Settings,
    inference::InferenceOptions,
    model::TableSchema,
};

pub use crate::{
    datetime::DateLocale,
    error::{GenerateError, SchemaError},
    generator::{GenerateOptions, generate_sql},
    inference::infer_types,
    model::{ColumnTypeInfo, ConversionResult, DataSource, SqlType},
    parser::parse_tabular_text,
};

/// Column width used by `convert --quick`.
pub const QUICK_TEXT_LENGTH: usize = 100;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("copy_as_insert", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => handle_convert(&args),
        Commands::Probe(args) => handle_probe(&args),
    }
}

fn inference_options(args: &InputArgs, settings: &Settings) -> InferenceOptions {
    let mut options = settings.inference_options();
    options.detect_bit |= args.detect_bit;
    if args.no_primary_key {
        options.detect_primary_key = false;
    }
    if let Some(locale) = args.date_locale {
        options.date_locale = locale;
    }
    options
}

/// Reads, parses, infers, and applies `--type` overrides.
fn load_schema(args: &InputArgs, settings: &Settings) -> Result<TableSchema> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let text = io_utils::read_input_text(&args.input, encoding)?;
    let mut schema = parser::parse_tabular_text(&text, !args.no_headers)
        .with_context(|| format!("Parsing tabular data from {:?}", args.input))?;

    let options = inference_options(args, settings);
    debug!("Inference options: {options:?}");
    inference::infer_types(&mut schema, &options);

    for (column, sql_type) in &args.type_overrides {
        schema
            .override_type(column, *sql_type)
            .with_context(|| format!("Applying --type {column}={sql_type}"))?;
        info!("Column '{column}' overridden to {sql_type}");
    }
    Ok(schema)
}

fn handle_convert(args: &ConvertArgs) -> Result<()> {
    let settings = Settings::load_or_default(args.input.config.as_deref())?;
    info!("Converting '{}' into table '{}'", args.input.input.display(), args.table);
    let mut schema = load_schema(&args.input, &settings)?;
    if args.quick {
        schema.force_text(QUICK_TEXT_LENGTH);
    }

    let mut options = settings.generate_options(&args.table);
    if let Some(schema_name) = &args.schema {
        options.schema_name = schema_name.clone();
    }
    options.temporal |= args.temporal;
    options.temporary |= args.temporary;
    options.append_temporal_suffix |= args.temporal_suffix;
    options.identity_primary_key |= args.identity_pk;
    if let Some(locale) = args.input.date_locale {
        options.date_locale = locale;
    }
    if args.quick {
        if options.temporal {
            warn!("--quick writes a temporary table; ignoring temporal settings");
        }
        options.temporary = true;
        options.temporal = false;
        options.append_temporal_suffix = false;
    }

    let result = generator::generate_sql(&schema, &options);
    if !result.success {
        bail!(
            "{}",
            result
                .error_message
                .unwrap_or_else(|| "SQL generation failed".to_string())
        );
    }
    io_utils::write_output(args.output.as_deref(), &result.generated_sql)?;
    info!("Converted {}", result.summary());
    Ok(())
}

fn handle_probe(args: &ProbeArgs) -> Result<()> {
    let settings = Settings::load_or_default(args.input.config.as_deref())?;
    info!("Probing '{}'", args.input.input.display());
    let schema = load_schema(&args.input, &settings)?;
    let rendered = match args.format {
        ProbeFormat::Table => table::render_schema_report(&schema),
        ProbeFormat::Json => {
            serde_json::to_string_pretty(&schema.columns).context("Serializing schema to JSON")?
        }
    };
    io_utils::write_output(None, rendered.trim_end())?;
    Ok(())
}
