//! Type Classifier
//!
//! Decides whether a raw table is a BOM or a placement list. A recognized
//! token in the file name is trusted first; otherwise the header structure
//! decides, placement before BOM since a KiCad position file also carries
//! Ref/Val/Package columns.

use super::mapper::HeaderMapping;
use super::TableKind;

const BOM_TOKENS: &[&str] = &["bom"];
const PLACEMENT_TOKENS: &[&str] = &["pos", "cpl"];

/// Classify a table from an optional file name hint and its raw headers.
/// `None` means the table is of unknown type and should be skipped.
pub fn classify(filename_hint: Option<&str>, raw_columns: &[String]) -> Option<TableKind> {
    if let Some(kind) = filename_hint.and_then(classify_by_name) {
        tracing::debug!("Classified {:?} as {} from its name", filename_hint, kind);
        return Some(kind);
    }
    classify_by_headers(raw_columns)
}

/// Look for a table-type token in a file name.
pub fn classify_by_name(filename: &str) -> Option<TableKind> {
    let name = filename.to_lowercase();
    if BOM_TOKENS.iter().any(|t| name.contains(t)) {
        Some(TableKind::Bom)
    } else if PLACEMENT_TOKENS.iter().any(|t| name.contains(t)) {
        Some(TableKind::Placement)
    } else {
        None
    }
}

/// Structural inference: the headers must cover every required field.
pub fn classify_by_headers(raw_columns: &[String]) -> Option<TableKind> {
    [TableKind::Placement, TableKind::Bom]
        .into_iter()
        .find(|kind| HeaderMapping::build(*kind, raw_columns).missing_required().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_name_hint_is_trusted() {
        let headers = cols(&["Something", "Else"]);
        assert_eq!(classify(Some("board-bom.csv"), &headers), Some(TableKind::Bom));
        assert_eq!(classify(Some("board-all-pos.csv"), &headers), Some(TableKind::Placement));
        assert_eq!(classify(Some("Board_CPL.csv"), &headers), Some(TableKind::Placement));
    }

    #[test]
    fn test_structural_placement() {
        let headers = cols(&["Ref", "Val", "Package", "PosX", "PosY", "Rot", "Side"]);
        assert_eq!(classify(Some("export.csv"), &headers), Some(TableKind::Placement));
    }

    #[test]
    fn test_structural_bom() {
        let headers = cols(&["Reference", "Value", "Datasheet", "Footprint", "Qty", "DNP"]);
        assert_eq!(classify(None, &headers), Some(TableKind::Bom));
    }

    #[test]
    fn test_unknown_table() {
        let headers = cols(&["Net", "Pin", "Length"]);
        assert_eq!(classify(Some("nets.csv"), &headers), None);
    }

    #[test]
    fn test_partial_placement_header_is_unknown() {
        let headers = cols(&["Designator", "PosX", "PosY"]);
        assert_eq!(classify_by_headers(&headers), None);
    }
}
