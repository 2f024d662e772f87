//! Persisted user settings.
//!
//! Settings live in a small YAML file. Every key is optional; anything
//! missing falls back to [`Settings::default`]. Command-line flags are applied
//! on top of the loaded values by the command handlers.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    datetime::DateLocale,
    generator::{DEFAULT_SCHEMA, GenerateOptions},
    inference::InferenceOptions,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_schema: String,
    pub temporal_by_default: bool,
    pub auto_append_temporal_suffix: bool,
    pub detect_bit_columns: bool,
    pub detect_primary_key: bool,
    pub identity_primary_key: bool,
    pub date_locale: DateLocale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA.to_string(),
            temporal_by_default: false,
            auto_append_temporal_suffix: false,
            detect_bit_columns: false,
            detect_primary_key: true,
            identity_primary_key: false,
            date_locale: DateLocale::Invariant,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening settings file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("Parsing settings YAML {path:?}"))
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating settings file {path:?}"))?;
        serde_yaml::to_writer(BufWriter::new(file), self).context("Writing settings YAML")
    }

    pub fn inference_options(&self) -> InferenceOptions {
        InferenceOptions {
            detect_bit: self.detect_bit_columns,
            detect_primary_key: self.detect_primary_key,
            date_locale: self.date_locale,
        }
    }

    pub fn generate_options(&self, table_name: &str) -> GenerateOptions {
        GenerateOptions {
            table_name: table_name.to_string(),
            schema_name: self.default_schema.clone(),
            temporal: self.temporal_by_default,
            temporary: false,
            append_temporal_suffix: self.auto_append_temporal_suffix,
            identity_primary_key: self.identity_primary_key,
            date_locale: self.date_locale,
        }
    }
}
