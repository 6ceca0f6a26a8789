//! Core conversion logic shared by the CLI and library users.
//! No terminal output; everything is returned as data.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::canonical::{aggregate, canonicalize_table, CanonicalTable, DEFAULT_PRECISION, MAX_PRECISION};
use crate::diagnostics::Diagnostics;
use crate::output::{is_generated_output, output_path_for, verify_output, write_table, OutputFormat};
use crate::schema::classifier::{classify, classify_by_name};
use crate::schema::{CanonicalField, HeaderMapping, TableKind};
use crate::table::{read_table, RawTable};

#[derive(Debug, thiserror::Error)]
pub enum FabPrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown table type: {0}")]
    UnknownTableType(String),
    #[error("Missing required {field} column in {kind} table")]
    MissingColumn { kind: TableKind, field: CanonicalField },
    #[error("No valid rows in {0}")]
    EmptyResult(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("{kind} output {} is already written by another input in this run", .path.display())]
    OutputConflict { kind: TableKind, path: PathBuf },
    #[error("Verification failed: {0}")]
    Verification(String),
    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("{0}")]
    Other(String),
}

/// Options for a conversion run.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Decimal places kept on placement coordinates (0..=4)
    pub precision: u32,
    /// Merge BOM rows with identical value, footprint and part number
    pub group_components: bool,
    pub output_format: OutputFormat,
    /// Where outputs go; next to each input when unset
    pub output_dir: Option<PathBuf>,
    /// Re-read written CSV outputs and check their headers
    pub verify_outputs: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            group_components: false,
            output_format: OutputFormat::Csv,
            output_dir: None,
            verify_outputs: true,
        }
    }
}

impl ConvertOptions {
    pub fn validate(&self) -> Result<(), FabPrepError> {
        if self.precision > MAX_PRECISION {
            return Err(FabPrepError::InvalidOption(format!(
                "precision must be between 0 and {}, got {}",
                MAX_PRECISION, self.precision
            )));
        }
        if !self.output_format.is_supported() {
            return Err(FabPrepError::InvalidOption(
                "xlsx output requires building with the `xlsx` feature".to_string(),
            ));
        }
        Ok(())
    }
}

/// A converted table plus everything noticed along the way.
#[derive(Debug, Clone)]
pub struct TableConversion {
    pub kind: TableKind,
    pub table: CanonicalTable,
    pub rows_read: usize,
    /// Rows that survived canonicalization, counted before any grouping
    pub rows_converted: usize,
    pub diagnostics: Diagnostics,
}

impl TableConversion {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_converted
    }
}

#[derive(Debug)]
pub enum FileStatus {
    Written(PathBuf),
    Skipped(FabPrepError),
}

/// Per-file outcome of a run.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub kind: Option<TableKind>,
    pub status: FileStatus,
    pub rows_written: usize,
    pub diagnostics: Diagnostics,
}

impl FileReport {
    fn skipped(input: &Path, kind: Option<TableKind>, error: FabPrepError) -> Self {
        Self {
            input: input.to_path_buf(),
            kind,
            status: FileStatus::Skipped(error),
            rows_written: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn output(&self) -> Option<&Path> {
        match &self.status {
            FileStatus::Written(path) => Some(path),
            FileStatus::Skipped(_) => None,
        }
    }

    pub fn is_written(&self) -> bool {
        self.output().is_some()
    }
}

/// Which of the two outputs a run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Produced {
    Bom,
    Placement,
    Both,
    Neither,
}

impl Produced {
    pub fn as_str(&self) -> &'static str {
        match self {
            Produced::Bom => "BOM",
            Produced::Placement => "placement",
            Produced::Both => "BOM and placement",
            Produced::Neither => "nothing",
        }
    }
}

/// Everything a multi-file run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    /// Run-level events such as output verification failures
    pub diagnostics: Diagnostics,
}

impl RunSummary {
    pub fn produced(&self) -> Produced {
        let bom = self.written(TableKind::Bom).next().is_some();
        let cpl = self.written(TableKind::Placement).next().is_some();
        match (bom, cpl) {
            (true, true) => Produced::Both,
            (true, false) => Produced::Bom,
            (false, true) => Produced::Placement,
            (false, false) => Produced::Neither,
        }
    }

    /// Output paths written for one table kind.
    pub fn written(&self, kind: TableKind) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(move |f| f.kind == Some(kind))
            .filter_map(FileReport::output)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_written())
    }

    pub fn any_written(&self) -> bool {
        self.files.iter().any(FileReport::is_written)
    }
}

/// Result of inspecting a table without converting it.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub input: PathBuf,
    pub delimiter: u8,
    pub columns: Vec<String>,
    pub rows: usize,
    pub kind_from_name: Option<TableKind>,
    pub kind: Option<TableKind>,
    pub mapping: Option<HeaderMapping>,
}

impl Inspection {
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        self.mapping
            .as_ref()
            .map(HeaderMapping::missing_required)
            .unwrap_or_default()
    }
}

/// Convert one raw table: classify, map headers, canonicalize rows and
/// optionally group the BOM. Fails only for an unknown table type or a
/// missing required column; bad rows end up in the diagnostics.
pub fn convert_table(
    filename_hint: Option<&str>,
    raw: &RawTable,
    options: &ConvertOptions,
) -> Result<TableConversion, FabPrepError> {
    let kind = classify(filename_hint, &raw.columns).ok_or_else(|| {
        FabPrepError::UnknownTableType(filename_hint.unwrap_or("table").to_string())
    })?;

    let mapping = HeaderMapping::resolve(kind, &raw.columns)?;

    let mut diagnostics = mapping_diagnostics(&mapping);
    let table = canonicalize_table(raw, &mapping, options.precision, &mut diagnostics);
    let converted = table.len();

    let table = match table {
        CanonicalTable::Bom(rows) if options.group_components => CanonicalTable::Bom(aggregate(rows)),
        other => other,
    };

    let dropped = raw.rows.len() - converted;
    if dropped > 0 {
        tracing::warn!("Dropped {} of {} {} rows", dropped, raw.rows.len(), kind);
    }

    Ok(TableConversion {
        kind,
        table,
        rows_read: raw.rows.len(),
        rows_converted: converted,
        diagnostics,
    })
}

/// Info diagnostics for columns the mapping left out.
fn mapping_diagnostics(mapping: &HeaderMapping) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    if !mapping.unmapped().is_empty() {
        diagnostics.info(format!("ignored columns: {}", mapping.unmapped().join(", ")));
    }
    for (field, column) in mapping.duplicates() {
        diagnostics.info(format!("column '{}' also maps to {}; using the first", column, field));
    }
    diagnostics
}

/// Recursively discover delimited inputs in a directory, skipping hidden
/// and build folders and files this tool generated.
pub fn discover_input_files(dir: &Path) -> Result<Vec<PathBuf>, FabPrepError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), FabPrepError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "target" || name == "build" || name.ends_with("-backups") {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() && !is_generated_output(&path) {
            let is_csv = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if is_csv {
                files.push(path);
            }
        }
    }
    Ok(())
}

fn file_name_hint(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Comparison key for an existing path.
fn path_key(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Comparison key for an output file, stable whether or not it exists yet.
fn output_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) if dir.as_os_str().is_empty() => path_key(Path::new(".")).join(name),
        (Some(dir), Some(name)) => path_key(dir).join(name),
        _ => path_key(path),
    }
}

/// Core conversion API used by the CLI.
pub struct FabPrepCore;

impl FabPrepCore {
    /// Convert a single file and write its output. Unknown tables and I/O
    /// problems are returned as errors. A table missing a required column
    /// or with no valid rows is reported as skipped and nothing is written.
    pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<FileReport, FabPrepError> {
        Self::convert_claiming(path, options, &mut HashSet::new())
    }

    /// Like [`Self::convert_file`], refusing to write an output path already
    /// present in `claimed`.
    fn convert_claiming(
        path: &Path,
        options: &ConvertOptions,
        claimed: &mut HashSet<PathBuf>,
    ) -> Result<FileReport, FabPrepError> {
        let raw = read_table(path)?;
        let conversion = match convert_table(file_name_hint(path), &raw, options) {
            Ok(conversion) => conversion,
            Err(FabPrepError::MissingColumn { kind, field }) => {
                let mapping = HeaderMapping::build(kind, &raw.columns);
                return Ok(FileReport {
                    input: path.to_path_buf(),
                    kind: Some(kind),
                    status: FileStatus::Skipped(FabPrepError::MissingColumn { kind, field }),
                    rows_written: 0,
                    diagnostics: mapping_diagnostics(&mapping),
                });
            }
            Err(e) => return Err(e),
        };

        let TableConversion {
            kind,
            table,
            mut diagnostics,
            ..
        } = conversion;
        let output = output_path_for(path, kind, options.output_format, options.output_dir.as_deref());

        if table.is_empty() {
            tracing::warn!("No valid {} rows in {}, nothing written", kind, path.display());
            if output.exists() {
                diagnostics.warning(format!(
                    "{} is left over from an earlier run and was not updated",
                    output.display()
                ));
            }
            return Ok(FileReport {
                input: path.to_path_buf(),
                kind: Some(kind),
                status: FileStatus::Skipped(FabPrepError::EmptyResult(path.display().to_string())),
                rows_written: 0,
                diagnostics,
            });
        }

        if !claimed.insert(output_key(&output)) {
            return Err(FabPrepError::OutputConflict { kind, path: output });
        }
        write_table(&table, &output, options.output_format)?;

        Ok(FileReport {
            input: path.to_path_buf(),
            kind: Some(kind),
            status: FileStatus::Written(output),
            rows_written: table.len(),
            diagnostics,
        })
    }

    /// Convert every given file, and every delimited file found under given
    /// directories. One file failing never stops the others; only invalid
    /// options or an unusable output directory abort the run. An input
    /// reached twice is converted once, and an input whose output path was
    /// already written in this run is skipped with `OutputConflict`.
    pub fn convert_paths(paths: &[PathBuf], options: &ConvertOptions) -> Result<RunSummary, FabPrepError> {
        options.validate()?;
        if let Some(dir) = &options.output_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut summary = RunSummary::default();
        let mut seen_inputs = HashSet::new();
        let mut claimed_outputs = HashSet::new();
        for path in paths {
            let inputs = if path.is_dir() {
                match discover_input_files(path) {
                    Ok(found) => found,
                    Err(e) => {
                        summary.files.push(FileReport::skipped(path, None, e));
                        continue;
                    }
                }
            } else {
                vec![path.clone()]
            };

            for input in inputs {
                if !seen_inputs.insert(path_key(&input)) {
                    tracing::debug!("{} was already converted in this run", input.display());
                    continue;
                }
                let report = Self::convert_claiming(&input, options, &mut claimed_outputs).unwrap_or_else(|e| {
                    tracing::warn!("Skipping {}: {}", input.display(), e);
                    let kind = match &e {
                        FabPrepError::MissingColumn { kind, .. } | FabPrepError::OutputConflict { kind, .. } => {
                            Some(*kind)
                        }
                        _ => None,
                    };
                    FileReport::skipped(&input, kind, e)
                });
                summary.files.push(report);
            }
        }

        if options.verify_outputs && options.output_format == OutputFormat::Csv {
            for file in &summary.files {
                if let (Some(kind), Some(output)) = (file.kind, file.output()) {
                    if let Err(e) = verify_output(output, kind) {
                        summary.diagnostics.error(e.to_string());
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Read a file and report how it would be classified and mapped.
    pub fn inspect(path: &Path) -> Result<Inspection, FabPrepError> {
        let raw = read_table(path)?;
        let hint = file_name_hint(path);
        let kind = classify(hint, &raw.columns);
        let mapping = kind.map(|k| HeaderMapping::build(k, &raw.columns));

        Ok(Inspection {
            input: path.to_path_buf(),
            delimiter: raw.delimiter,
            rows: raw.rows.len(),
            kind_from_name: hint.and_then(classify_by_name),
            kind,
            mapping,
            columns: raw.columns,
        })
    }
}
