//! Input reading and output writing.
//!
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **Encoding**: input bytes are decoded via `encoding_rs`, defaulting to
//!   UTF-8; a byte-order mark overrides the requested label.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Reads the whole input (file or `-` for stdin) and decodes it.
pub fn read_input_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading input from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    decode_bytes(&bytes, encoding).with_context(|| format!("Decoding input {path:?}"))
}

/// Writes `text` plus a trailing newline to `path`, or to stdout when the
/// path is absent or `-`.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout().lock()),
    };
    writeln!(writer, "{text}").context("Writing output")?;
    writer.flush().context("Flushing output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolves_known_labels_and_rejects_unknown() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(
            resolve_encoding(Some(" windows-1252 ")).unwrap().name(),
            "windows-1252"
        );
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn decodes_legacy_single_byte_input() {
        let encoding = resolve_encoding(Some("latin1")).unwrap();
        assert_eq!(decode_bytes(b"Caf\xe9", encoding).unwrap(), "Café");
        assert!(decode_bytes(b"Caf\xe9", UTF_8).is_err());
    }

    #[test]
    fn output_file_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.sql");
        write_output(Some(&path), "SELECT 1;").unwrap();
        assert_eq!(read_input_text(&path, UTF_8).unwrap(), "SELECT 1;\n");
    }
}
