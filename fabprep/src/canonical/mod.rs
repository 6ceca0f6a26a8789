//! Canonical rows and tables in the assembly vendor's schema.

pub mod aggregate;
pub mod normalize;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::TableKind;

pub use aggregate::aggregate;
pub use normalize::{
    canonicalize_bom, canonicalize_placement, canonicalize_table, format_coordinate,
    normalize_rotation, parse_quantity, round_coordinate, RowError, DEFAULT_PRECISION,
    MAX_PRECISION,
};

/// Output header of a JLCPCB BOM.
pub const BOM_HEADER: [&str; 5] = ["Designator", "Quantity", "Value", "Footprint", "Part Number"];

/// Output header of a JLCPCB component placement list.
pub const CPL_HEADER: [&str; 5] = ["Designator", "Mid X", "Mid Y", "Rotation", "Layer"];

/// Board side a component is mounted on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    #[default]
    Top,
    Bottom,
}

impl Layer {
    /// Lenient side parsing: anything that is not "top" or "bottom"
    /// (case-insensitive, trimmed) is treated as top.
    pub fn from_side(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("bottom") {
            Layer::Bottom
        } else {
            Layer::Top
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Top => "top",
            Layer::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One BOM line. `reference` may hold a ", "-joined list after grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomRow {
    pub reference: String,
    pub quantity: u32,
    pub value: String,
    pub footprint: String,
    pub part_number: String,
}

impl BomRow {
    pub fn new(
        reference: impl Into<String>,
        quantity: u32,
        value: impl Into<String>,
        footprint: impl Into<String>,
        part_number: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            quantity: quantity.max(1),
            value: value.into(),
            footprint: footprint.into(),
            part_number: part_number.into(),
        }
    }

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.reference.clone(),
            self.quantity.to_string(),
            self.value.clone(),
            self.footprint.clone(),
            self.part_number.clone(),
        ]
    }
}

/// One placed component. Coordinates are millimeters already rounded to
/// the configured precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRow {
    pub reference: String,
    pub x: Decimal,
    pub y: Decimal,
    /// Integer degrees in [0, 360)
    pub rotation: u16,
    pub layer: Layer,
}

impl PlacementRow {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.reference.clone(),
            format_coordinate(self.x),
            format_coordinate(self.y),
            self.rotation.to_string(),
            self.layer.as_str().to_string(),
        ]
    }
}

/// Validated output table, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalTable {
    Bom(Vec<BomRow>),
    Placement(Vec<PlacementRow>),
}

impl CanonicalTable {
    pub fn empty(kind: TableKind) -> Self {
        match kind {
            TableKind::Bom => CanonicalTable::Bom(Vec::new()),
            TableKind::Placement => CanonicalTable::Placement(Vec::new()),
        }
    }

    pub fn kind(&self) -> TableKind {
        match self {
            CanonicalTable::Bom(_) => TableKind::Bom,
            CanonicalTable::Placement(_) => TableKind::Placement,
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            CanonicalTable::Bom(_) => &BOM_HEADER,
            CanonicalTable::Placement(_) => &CPL_HEADER,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CanonicalTable::Bom(rows) => rows.len(),
            CanonicalTable::Placement(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rendered cell text for every row, in output column order.
    pub fn records(&self) -> Vec<Vec<String>> {
        match self {
            CanonicalTable::Bom(rows) => rows.iter().map(BomRow::to_record).collect(),
            CanonicalTable::Placement(rows) => rows.iter().map(PlacementRow::to_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_layer_from_side() {
        assert_eq!(Layer::from_side("Top"), Layer::Top);
        assert_eq!(Layer::from_side(" BOTTOM "), Layer::Bottom);
        assert_eq!(Layer::from_side("none"), Layer::Top);
        assert_eq!(Layer::from_side(""), Layer::Top);
        assert_eq!(Layer::from_side("B.Cu"), Layer::Top);
    }

    #[test]
    fn test_bom_row_quantity_floor() {
        let row = BomRow::new("R1", 0, "10k", "0603", "");
        assert_eq!(row.quantity, 1);
    }

    #[test]
    fn test_placement_record_rendering() {
        let row = PlacementRow {
            reference: "U3".to_string(),
            x: Decimal::from_str("12.30").unwrap(),
            y: Decimal::from_str("-4.05").unwrap(),
            rotation: 270,
            layer: Layer::Bottom,
        };
        assert_eq!(row.to_record(), vec!["U3", "12.30mm", "-4.05mm", "270", "bottom"]);
    }

    #[test]
    fn test_table_header_by_kind() {
        assert_eq!(CanonicalTable::empty(TableKind::Bom).header(), &BOM_HEADER);
        assert_eq!(CanonicalTable::empty(TableKind::Placement).header(), &CPL_HEADER);
        assert!(CanonicalTable::empty(TableKind::Bom).is_empty());
    }
}
