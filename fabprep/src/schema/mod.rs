//! Table kinds, canonical fields and header resolution.

pub mod aliases;
pub mod classifier;
pub mod mapper;

use serde::{Deserialize, Serialize};

pub use aliases::{canonical_field_for, normalize_header, AliasRegistry};
pub use classifier::classify;
pub use mapper::HeaderMapping;

/// The two table shapes the converter understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Bom,
    Placement,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Bom => "BOM",
            TableKind::Placement => "placement",
        }
    }

    /// Fields that must be mapped for a table of this kind to be accepted.
    pub fn required_fields(&self) -> &'static [CanonicalField] {
        match self {
            TableKind::Bom => &[
                CanonicalField::Reference,
                CanonicalField::Value,
                CanonicalField::Footprint,
            ],
            TableKind::Placement => &[
                CanonicalField::Reference,
                CanonicalField::X,
                CanonicalField::Y,
                CanonicalField::Rotation,
                CanonicalField::Layer,
            ],
        }
    }

    pub fn all() -> [TableKind; 2] {
        [TableKind::Bom, TableKind::Placement]
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed output-side field names that source columns are mapped onto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Reference,
    Quantity,
    Value,
    Footprint,
    PartNumber,
    X,
    Y,
    Rotation,
    Layer,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Reference => "reference",
            CanonicalField::Quantity => "quantity",
            CanonicalField::Value => "value",
            CanonicalField::Footprint => "footprint",
            CanonicalField::PartNumber => "part_number",
            CanonicalField::X => "x",
            CanonicalField::Y => "y",
            CanonicalField::Rotation => "rotation",
            CanonicalField::Layer => "layer",
        }
    }

    pub fn is_required_for(&self, kind: TableKind) -> bool {
        kind.required_fields().contains(self)
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
