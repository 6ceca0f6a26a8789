//! fabprep - KiCad BOM and placement export conversion for JLCPCB assembly
//!
//! This library reads the BOM and component position tables that KiCad
//! exports, works out which is which, maps their loosely-named columns onto
//! a fixed set of fields and writes them back out in the exact column
//! layout the JLCPCB assembly service expects.
//!
//! # Quick Start
//!
//! ```no_run
//! use fabprep::{ConvertOptions, FabPrepCore};
//! use std::path::PathBuf;
//!
//! let options = ConvertOptions::default();
//! let summary = FabPrepCore::convert_paths(
//!     &[PathBuf::from("board-bom.csv"), PathBuf::from("board-all-pos.csv")],
//!     &options,
//! ).unwrap();
//!
//! for file in &summary.files {
//!     for diagnostic in &file.diagnostics {
//!         println!("{}: {}", file.input.display(), diagnostic);
//!     }
//! }
//! println!("produced {}", summary.produced().as_str());
//! ```
//!
//! # Pipeline
//!
//! ```text
//! raw table -> classify -> map headers -> canonicalize rows -> (group BOM) -> write
//! ```
//!
//! - **Classification**: file name token ("bom", "pos", "cpl") or header structure
//! - **Header mapping**: fixed alias lists, case and punctuation insensitive
//! - **Canonicalization**: coordinate rounding, rotation folded into [0, 360),
//!   lenient top/bottom side
//! - **Grouping**: optional merge of identical BOM lines

pub mod canonical;
pub mod core;
pub mod diagnostics;
pub mod output;
pub mod schema;
pub mod table;

// Re-export main types
pub use canonical::{BomRow, CanonicalTable, Layer, PlacementRow, RowError, BOM_HEADER, CPL_HEADER};
pub use core::{
    convert_table, discover_input_files, ConvertOptions, FabPrepCore, FabPrepError, FileReport,
    FileStatus, Inspection, Produced, RunSummary, TableConversion,
};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use output::OutputFormat;
pub use schema::{CanonicalField, HeaderMapping, TableKind};
pub use table::{RawRow, RawTable};

/// Read a delimited file into a raw table (convenience wrapper).
pub fn read_table(path: &std::path::Path) -> Result<RawTable, FabPrepError> {
    table::read_table(path)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CanonicalTable, ConvertOptions, FabPrepCore, FabPrepError, OutputFormat, Produced,
        RunSummary, Severity, TableKind,
    };
}
