//! Alias Registry
//!
//! Static mapping from each canonical field to the header spellings that
//! KiCad (and hand-edited exports) use for it. Spellings are stored in
//! normalized form: lower-case ASCII letters and digits only. The reverse
//! lookup table is built on first use and never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::{CanonicalField, TableKind};

const BOM_ALIASES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Reference,
        &["reference", "references", "ref", "refs", "designator", "designators", "refdes"],
    ),
    (
        CanonicalField::Quantity,
        &["quantity", "qty", "qnty", "quantityperpcb", "count"],
    ),
    (CanonicalField::Value, &["value", "val", "comment"]),
    (
        CanonicalField::Footprint,
        &["footprint", "footprints", "package", "pcbfootprint", "fp"],
    ),
    (
        CanonicalField::PartNumber,
        &[
            "mfgpart",
            "mfgpartnumber",
            "mpn",
            "manufacturerpartnumber",
            "manufacturerpart",
            "partnumber",
            "partno",
            "pn",
            "lcsc",
            "lcscpart",
            "lcscpartnumber",
        ],
    ),
];

const PLACEMENT_ALIASES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Reference, &["designator", "reference", "ref", "refdes"]),
    (CanonicalField::X, &["posx", "x", "midx", "centerx", "locationx", "xmm"]),
    (CanonicalField::Y, &["posy", "y", "midy", "centery", "locationy", "ymm"]),
    (CanonicalField::Rotation, &["rotation", "rot", "angle", "orientation"]),
    (CanonicalField::Layer, &["side", "layer", "tb", "boardside"]),
];

/// Accepted header spellings for one table kind.
pub struct AliasRegistry {
    kind: TableKind,
    entries: &'static [(CanonicalField, &'static [&'static str])],
    lookup: HashMap<&'static str, CanonicalField>,
}

static BOM_REGISTRY: LazyLock<AliasRegistry> =
    LazyLock::new(|| AliasRegistry::build(TableKind::Bom, BOM_ALIASES));
static PLACEMENT_REGISTRY: LazyLock<AliasRegistry> =
    LazyLock::new(|| AliasRegistry::build(TableKind::Placement, PLACEMENT_ALIASES));

impl AliasRegistry {
    fn build(kind: TableKind, entries: &'static [(CanonicalField, &'static [&'static str])]) -> Self {
        let mut lookup = HashMap::new();
        for (field, spellings) in entries {
            for spelling in spellings.iter() {
                // First claim wins; overlaps are caught by the registry tests.
                lookup.entry(*spelling).or_insert(*field);
            }
        }
        Self {
            kind,
            entries,
            lookup,
        }
    }

    /// The process-wide registry for a table kind.
    pub fn for_kind(kind: TableKind) -> &'static AliasRegistry {
        match kind {
            TableKind::Bom => &*BOM_REGISTRY,
            TableKind::Placement => &*PLACEMENT_REGISTRY,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Resolve a raw header to its canonical field.
    pub fn lookup(&self, raw_header: &str) -> Option<CanonicalField> {
        let key = normalize_header(raw_header);
        if key.is_empty() {
            return None;
        }
        self.lookup.get(key.as_str()).copied()
    }

    /// Fields and their spellings, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (CanonicalField, &'static [&'static str])> + '_ {
        self.entries.iter().map(|(field, spellings)| (*field, *spellings))
    }

    pub fn aliases(&self, field: CanonicalField) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, spellings)| *spellings)
            .unwrap_or(&[])
    }
}

/// Reduce a header to its comparison key: surrounding whitespace, quotes and
/// byte-order marks removed, lower-cased, punctuation and spacing dropped.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '\u{feff}')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn canonical_field_for(kind: TableKind, raw_header: &str) -> Option<CanonicalField> {
    AliasRegistry::for_kind(kind).lookup(raw_header)
}
