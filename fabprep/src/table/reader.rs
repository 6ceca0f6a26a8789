//! Delimited text reader.
//!
//! Accepts comma, semicolon or tab separated exports, detected from the
//! header line, with or without a UTF-8 byte-order mark. Invalid UTF-8 is
//! replaced rather than rejected since some tool versions export Latin-1
//! footprint names.

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use super::{RawRow, RawTable};
use crate::core::FabPrepError;

const UTF8_BOM: char = '\u{feff}';
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Read and tokenize a delimited file. The file handle is closed before
/// this returns, on success or on error.
pub fn read_table(path: &Path) -> Result<RawTable, FabPrepError> {
    let data = std::fs::read(path)?;
    parse_table(&data)
}

/// Tokenize an in-memory delimited table.
pub fn parse_table(data: &[u8]) -> Result<RawTable, FabPrepError> {
    let text = String::from_utf8_lossy(data);
    let text = text.trim_start_matches(UTF8_BOM);

    let delimiter = detect_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_matches(UTF8_BOM).to_string())
        .collect();

    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(FabPrepError::Other("file has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Skip rows that are entirely blank, e.g. trailing ",,,," lines.
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(RawRow::new(line, record.iter().map(str::to_string).collect()));
    }

    tracing::debug!(
        "Read table with {} columns and {} rows ({:?} delimited)",
        columns.len(),
        rows.len(),
        delimiter as char
    );

    Ok(RawTable {
        columns,
        rows,
        delimiter,
    })
}

/// Pick the delimiter that occurs most often, outside quotes, on the first
/// non-empty line. Falls back to comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for b in first_line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(pos) = CANDIDATE_DELIMITERS.iter().position(|&d| d == b) {
            counts[pos] += 1;
        }
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    CANDIDATE_DELIMITERS[best]
}
