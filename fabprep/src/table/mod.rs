//! Raw, untyped tables as read from a delimited export.

pub mod reader;

pub use reader::{detect_delimiter, parse_table, read_table};

/// One data row of a raw table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    /// Cell text at a column position, if the row is long enough.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header row plus data rows, exactly as they appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
    pub delimiter: u8,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            columns,
            rows,
            delimiter: b',',
        }
    }

    /// Build a table from string literals. Line numbers start at 2 since
    /// line 1 is the header.
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| RawRow::new(i + 2, cells.iter().map(|c| c.to_string()).collect()))
            .collect();
        Self::new(columns, rows)
    }

    /// A row is well-formed when it has a cell for every declared column.
    pub fn is_complete(&self, row: &RawRow) -> bool {
        row.len() >= self.columns.len()
    }

    pub fn delimiter_name(&self) -> &'static str {
        delimiter_name(self.delimiter)
    }
}

/// Human-readable name of a field delimiter.
pub fn delimiter_name(delimiter: u8) -> &'static str {
    match delimiter {
        b';' => "semicolon",
        b'\t' => "tab",
        _ => "comma",
    }
}
