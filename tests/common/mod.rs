#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use copy_as_insert::{DataSource, model::TableSchema};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a schema from literal headers and rows.
pub fn schema_from(headers: &[&str], rows: &[&[&str]]) -> TableSchema {
    TableSchema::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
        DataSource::ClipboardTsv,
    )
    .expect("rectangular rows")
}

/// Builds a single-column schema named `Value`.
pub fn column_of(values: &[&str]) -> TableSchema {
    TableSchema::new(
        vec!["Value".to_string()],
        values.iter().map(|v| vec![v.to_string()]).collect(),
        DataSource::ClipboardSingle,
    )
    .expect("single column")
}
