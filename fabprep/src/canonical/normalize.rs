//! Row Canonicalizer
//!
//! Turns mapped raw cell text into typed canonical rows. A row that cannot
//! be converted yields a [`RowError`]; [`canonicalize_table`] records it as
//! a diagnostic and moves on, so one bad line never costs the whole table.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::{BomRow, CanonicalTable, Layer, PlacementRow};
use crate::diagnostics::Diagnostics;
use crate::schema::{CanonicalField, HeaderMapping};
use crate::table::{RawRow, RawTable};

/// Decimal places kept on coordinates unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 2;
/// Finest coordinate precision the converter will emit.
pub const MAX_PRECISION: u32 = 4;

const MM_SUFFIX: &str = "mm";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing value for {field}")]
    Missing { field: CanonicalField },

    #[error("{field}: '{raw}' is not a number")]
    Value { field: CanonicalField, raw: String },

    #[error("row has {found} cells, header declares {expected}")]
    Incomplete { expected: usize, found: usize },
}

/// Convert one BOM row.
pub fn canonicalize_bom(row: &RawRow, mapping: &HeaderMapping) -> Result<BomRow, RowError> {
    let reference = required(mapping, row, CanonicalField::Reference)?;
    let value = required(mapping, row, CanonicalField::Value)?;
    let footprint = required(mapping, row, CanonicalField::Footprint)?;
    let part_number = mapping
        .value(CanonicalField::PartNumber, row)
        .unwrap_or_default();
    let quantity = parse_quantity(mapping.value(CanonicalField::Quantity, row));

    Ok(BomRow::new(reference, quantity, value, footprint, part_number))
}

/// Convert one placement row, rounding coordinates to `precision` places.
pub fn canonicalize_placement(
    row: &RawRow,
    mapping: &HeaderMapping,
    precision: u32,
) -> Result<PlacementRow, RowError> {
    let reference = required(mapping, row, CanonicalField::Reference)?;
    let x = parse_coordinate(CanonicalField::X, required(mapping, row, CanonicalField::X)?)?;
    let y = parse_coordinate(CanonicalField::Y, required(mapping, row, CanonicalField::Y)?)?;
    let rotation = parse_rotation(required(mapping, row, CanonicalField::Rotation)?)?;
    let layer = Layer::from_side(mapping.value(CanonicalField::Layer, row).unwrap_or_default());

    Ok(PlacementRow {
        reference: reference.to_string(),
        x: round_coordinate(x, precision),
        y: round_coordinate(y, precision),
        rotation,
        layer,
    })
}

/// Convert every row of a table. Rows that fail are reported in
/// `diagnostics` and left out of the result.
pub fn canonicalize_table(
    table: &RawTable,
    mapping: &HeaderMapping,
    precision: u32,
    diagnostics: &mut Diagnostics,
) -> CanonicalTable {
    let mut output = CanonicalTable::empty(mapping.kind());

    for row in &table.rows {
        let result = if !table.is_complete(row) {
            Err(RowError::Incomplete {
                expected: table.columns.len(),
                found: row.len(),
            })
        } else {
            match &mut output {
                CanonicalTable::Bom(rows) => canonicalize_bom(row, mapping).map(|r| rows.push(r)),
                CanonicalTable::Placement(rows) => {
                    canonicalize_placement(row, mapping, precision).map(|r| rows.push(r))
                }
            }
        };

        if let Err(e) = result {
            tracing::warn!("Skipping line {}: {}", row.line, e);
            diagnostics.row_warning(row.line, format!("skipped row: {}", e));
        }
    }

    output
}

fn required<'r>(
    mapping: &HeaderMapping,
    row: &'r RawRow,
    field: CanonicalField,
) -> Result<&'r str, RowError> {
    match mapping.value(field, row) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(RowError::Missing { field }),
    }
}

/// Quantities must be clean positive integers; anything else counts as one.
pub fn parse_quantity(raw: Option<&str>) -> u32 {
    raw.and_then(|text| text.trim().parse::<u32>().ok())
        .filter(|q| *q >= 1)
        .unwrap_or(1)
}

fn parse_coordinate(field: CanonicalField, raw: &str) -> Result<Decimal, RowError> {
    let text = raw.trim();
    let text = text.strip_suffix(MM_SUFFIX).unwrap_or(text).trim_end();

    if let Ok(d) = Decimal::from_str(text) {
        return Ok(d);
    }
    if let Ok(d) = Decimal::from_scientific(text) {
        return Ok(d);
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .and_then(Decimal::from_f64)
        .ok_or_else(|| RowError::Value {
            field,
            raw: raw.to_string(),
        })
}

fn parse_rotation(raw: &str) -> Result<u16, RowError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(normalize_rotation)
        .ok_or_else(|| RowError::Value {
            field: CanonicalField::Rotation,
            raw: raw.to_string(),
        })
}

/// Truncate to whole degrees and fold into [0, 360). KiCad writes
/// counter-clockwise negatives (-90) where the vendor expects 270.
pub fn normalize_rotation(degrees: f64) -> Option<u16> {
    if !degrees.is_finite() {
        return None;
    }
    let whole = degrees.trunc() as i64;
    Some(whole.rem_euclid(360) as u16)
}

/// Round half away from zero to `precision` places, keeping trailing zeros
/// so the value renders with exactly that many decimals.
pub fn round_coordinate(value: Decimal, precision: u32) -> Decimal {
    let precision = precision.min(MAX_PRECISION);
    let mut rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

pub fn format_coordinate(value: Decimal) -> String {
    format!("{}{}", value, MM_SUFFIX)
}
