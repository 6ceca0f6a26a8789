//! Output writers for canonical tables.
//!
//! CSV is always available. Spreadsheet output is compiled in with the
//! `xlsx` feature.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalTable, BOM_HEADER, CPL_HEADER};
use crate::core::FabPrepError;
use crate::schema::TableKind;

const BOM_SUFFIX: &str = "_jlcpcb_bom";
const CPL_SUFFIX: &str = "_jlcpcb_cpl";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    /// Whether this build can write the format.
    pub fn is_supported(&self) -> bool {
        match self {
            OutputFormat::Csv => true,
            OutputFormat::Xlsx => cfg!(feature = "xlsx"),
        }
    }
}

/// Output file path for a converted input: `<stem>_jlcpcb_bom.<ext>` or
/// `<stem>_jlcpcb_cpl.<ext>`, placed in `out_dir` or next to the input.
pub fn output_path_for(
    input: &Path,
    kind: TableKind,
    format: OutputFormat,
    out_dir: Option<&Path>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("board");
    let suffix = match kind {
        TableKind::Bom => BOM_SUFFIX,
        TableKind::Placement => CPL_SUFFIX,
    };
    let file_name = format!("{}{}.{}", stem, suffix, format.extension());
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}

/// True for files this tool wrote itself, so directory scans skip them.
pub fn is_generated_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.ends_with(BOM_SUFFIX) || stem.ends_with(CPL_SUFFIX))
        .unwrap_or(false)
}

/// Write a canonical table with its fixed header.
pub fn write_table(
    table: &CanonicalTable,
    path: &Path,
    format: OutputFormat,
) -> Result<(), FabPrepError> {
    match format {
        OutputFormat::Csv => write_csv(table, path)?,
        OutputFormat::Xlsx => write_xlsx(table, path)?,
    }
    tracing::info!("Wrote {} {} rows to {}", table.len(), table.kind(), path.display());
    Ok(())
}

fn write_csv(table: &CanonicalTable, path: &Path) -> Result<(), FabPrepError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.header())?;
    for record in table.records() {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "xlsx")]
fn write_xlsx(table: &CanonicalTable, path: &Path) -> Result<(), FabPrepError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.header().iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }
    for (i, record) in table.records().iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in record.iter().enumerate() {
            let col = col as u16;
            // Quantity goes in as a number so spreadsheet sums work.
            match (table, col, cell.parse::<f64>()) {
                (CanonicalTable::Bom(_), 1, Ok(qty)) => worksheet.write_number(row, col, qty)?,
                _ => worksheet.write_string(row, col, cell.as_str())?,
            };
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn write_xlsx(_table: &CanonicalTable, _path: &Path) -> Result<(), FabPrepError> {
    Err(FabPrepError::InvalidOption(
        "xlsx output requires building with the `xlsx` feature".to_string(),
    ))
}

/// Re-read a written CSV and check its header. The BOM header must hold
/// exactly the five BOM columns in any order; the placement header must
/// match column for column.
pub fn verify_output(path: &Path, kind: TableKind) -> Result<(), FabPrepError> {
    if !path.exists() {
        return Err(FabPrepError::Verification(format!(
            "{} file '{}' does not exist",
            kind,
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let valid = match kind {
        TableKind::Bom => {
            let found: HashSet<&str> = header.iter().map(String::as_str).collect();
            let expected: HashSet<&str> = BOM_HEADER.iter().copied().collect();
            header.len() == BOM_HEADER.len() && found == expected
        }
        TableKind::Placement => header == CPL_HEADER,
    };

    if valid {
        Ok(())
    } else {
        Err(FabPrepError::Verification(format!(
            "{} file '{}' has incorrect headers: {}",
            kind,
            path.display(),
            header.join(", ")
        )))
    }
}
