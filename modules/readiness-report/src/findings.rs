//! Bounded preview of a findings CSV with an unknown column set.

use std::io::Read;

pub const PREVIEW_ROWS: usize = 25;
pub const FALLBACK_COLUMNS: usize = 6;
pub const PREFERRED_COLUMNS: &[&str] = &["Severity", "Category", "Title", "Host", "Asset", "Algorithm", "Recommendation"];

/// One findings row as `(column, cell)` pairs in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingRow {
    cells: Vec<(String, String)>,
}

impl FindingRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingsPreview {
    /// Columns chosen for display.
    pub columns: Vec<String>,
    pub rows: Vec<FindingRow>,
}

/// `preferred ∩ available` in preferred order, or the first `fallback` available columns when
/// none of the preferred ones exist.
pub fn select_columns(preferred: &[&str], available: &[String], fallback: usize) -> Vec<String> {
    let picked: Vec<String> = preferred
        .iter()
        .filter(|p| available.iter().any(|a| a == *p))
        .map(|p| p.to_string())
        .collect();
    if picked.is_empty() {
        available.iter().take(fallback).cloned().collect()
    } else {
        picked
    }
}

/// Read the header and at most `limit` data rows; the remainder of the input is never read.
///
/// Rows shorter than the header are padded with "", surplus cells are dropped, invalid UTF-8
/// is replaced rather than rejected.
pub fn read_preview<R: Read>(reader: R, limit: usize) -> Result<FindingsPreview, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).has_headers(true).from_reader(reader);
    let header: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while rows.len() < limit && rdr.read_byte_record(&mut record)? {
        let cells = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cell = record.get(i).map(|c| String::from_utf8_lossy(c).into_owned()).unwrap_or_default();
                (name.clone(), cell)
            })
            .collect();
        rows.push(FindingRow { cells });
    }

    let columns = select_columns(PREFERRED_COLUMNS, &header, FALLBACK_COLUMNS);
    Ok(FindingsPreview { columns, rows })
}
