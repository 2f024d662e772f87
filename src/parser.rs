//! Splits pasted spreadsheet text into a rectangular [`TableSchema`].
//!
//! This is a plain delimiter split (tab, then comma, then single column), not
//! a CSV reader: quoted fields and embedded delimiters are not interpreted.

use anyhow::{Result, bail};
use log::debug;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::model::{DataSource, TableSchema};

/// Strips accents (via canonical decomposition) and removes spaces.
pub fn normalize_column_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c) && *c != ' ')
        .nfc()
        .collect()
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect()
}

fn detect_delimiter(first_line: &str) -> Option<char> {
    ['\t', ','].into_iter().find(|d| first_line.contains(*d))
}

fn split_fields(line: &str, delimiter: Option<char>) -> Vec<&str> {
    match delimiter {
        Some(d) => line.split(d).map(str::trim).collect(),
        None => vec![line.trim()],
    }
}

/// Heuristic used before attempting a parse: at least two non-empty lines and
/// a tab or comma in the first one.
pub fn is_valid_tabular_text(text: &str) -> bool {
    let lines = split_lines(text);
    lines.len() >= 2 && detect_delimiter(lines[0]).is_some()
}

/// Parses delimited text. With `has_headers` the first line names the
/// columns; otherwise columns are named `Col1..ColN` after the first line's
/// width. Data rows are padded or truncated to the column count.
pub fn parse_tabular_text(text: &str, has_headers: bool) -> Result<TableSchema> {
    if text.trim().is_empty() {
        bail!("Input is empty");
    }
    let lines = split_lines(text);
    let Some(first_line) = lines.first() else {
        bail!("No data found in input");
    };

    let delimiter = detect_delimiter(first_line);
    let source = match delimiter {
        Some('\t') => DataSource::ClipboardTsv,
        Some(_) => DataSource::ClipboardCsv,
        None => DataSource::ClipboardSingle,
    };

    let first_fields = split_fields(first_line, delimiter);
    let (headers, data_lines) = if has_headers {
        let headers = first_fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let name = normalize_column_name(field);
                if name.is_empty() { format!("Col{}", idx + 1) } else { name }
            })
            .collect::<Vec<_>>();
        (headers, &lines[1..])
    } else {
        let headers = (1..=first_fields.len())
            .map(|idx| format!("Col{idx}"))
            .collect::<Vec<_>>();
        (headers, &lines[..])
    };

    let width = headers.len();
    let rows = data_lines
        .iter()
        .map(|line| {
            let mut fields = split_fields(line, delimiter)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            fields.resize(width, String::new());
            fields
        })
        .collect::<Vec<_>>();

    debug!(
        "Parsed {} column(s) and {} row(s) as {source}",
        width,
        rows.len()
    );
    Ok(TableSchema::new(headers, rows, source)?)
}
