//! BOM-tolerant reading of JSON and CSV inputs.
//!
//! Windows producers (PowerShell `Out-File`, Excel) routinely prefix UTF-8 output with a
//! byte-order mark, so every input goes through here.

use crate::InputError;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drop a leading UTF-8 byte-order mark, if any.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Fail with [`InputError::NotFound`] unless `path` exists.
pub fn require_file(kind: &'static str, path: &Path) -> Result<(), InputError> {
    if path.exists() {
        Ok(())
    } else {
        Err(InputError::NotFound { kind, path: path.to_path_buf() })
    }
}

/// Read a whole JSON document into memory.
pub fn read_json(kind: &'static str, path: &Path) -> Result<Value, InputError> {
    require_file(kind, path)?;
    let bytes = std::fs::read(path).map_err(|source| InputError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_slice(strip_bom(&bytes)).map_err(|source| InputError::Json { path: path.to_path_buf(), source })
}

/// Open a file for streaming with any leading BOM already consumed.
pub fn open_bom_tolerant(kind: &'static str, path: &Path) -> Result<BufReader<File>, InputError> {
    require_file(kind, path)?;
    let read_err = |source| InputError::Read { path: path.to_path_buf(), source };
    let mut reader = BufReader::new(File::open(path).map_err(read_err)?);
    let has_bom = reader.fill_buf().map_err(read_err)?.starts_with(UTF8_BOM);
    if has_bom {
        reader.consume(UTF8_BOM.len());
    }
    Ok(reader)
}
