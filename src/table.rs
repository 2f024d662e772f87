//! Plain-text rendering of an inferred schema for the `probe` command.

use std::{borrow::Cow, fmt::Write as _};

use crate::model::TableSchema;

/// Sample values longer than this are shortened with a trailing `...`.
const SAMPLE_WIDTH: usize = 32;

const REPORT_HEADERS: [&str; 8] = [
    "#", "column", "type", "confidence", "nullable", "max_len", "sample", "reason",
];

/// One line per column: position, name, type, confidence, nullability,
/// max length, sample, and reason. Primary-key columns are marked with `*`.
pub fn render_schema_report(schema: &TableSchema) -> String {
    let rows = schema
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let name = if column.is_primary_key {
                format!("{} *", column.name)
            } else {
                column.name.clone()
            };
            vec![
                (idx + 1).to_string(),
                name,
                column.sql_type.to_string(),
                format!("{}%", column.confidence_percent),
                if column.allow_null { "yes" } else { "no" }.to_string(),
                column
                    .max_length
                    .map(|len| len.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                truncate_cell(&column.sample_value, SAMPLE_WIDTH).into_owned(),
                column.reason.clone(),
            ]
        })
        .collect::<Vec<_>>();

    let mut output = render_table(&REPORT_HEADERS, &rows);
    let _ = writeln!(
        output,
        "\n{} column(s), {} row(s), source {}",
        schema.column_count(),
        schema.row_count(),
        schema.source
    );
    output
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&sanitize_cell(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers.iter().copied(), &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(1)))
        .collect::<Vec<_>>();
    let _ = writeln!(
        output,
        "{}",
        format_row(separator.iter().map(String::as_str), &widths)
    );
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row.iter().map(String::as_str), &widths));
    }
    output
}

fn format_row<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = values
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&sanitized));
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

/// Character count, ignoring ANSI colour escapes.
fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

fn truncate_cell(value: &str, max: usize) -> Cow<'_, str> {
    if value.chars().count() <= max {
        return Cow::Borrowed(value);
    }
    let kept = value.chars().take(max.saturating_sub(3)).collect::<String>();
    Cow::Owned(format!("{kept}..."))
}
