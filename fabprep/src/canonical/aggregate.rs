//! BOM Aggregator
//!
//! Rows with the same value, footprint and part number are the same
//! logical component. They collapse into one line whose designator list
//! joins every reference and whose quantity is the sum.

use std::collections::HashMap;

use super::BomRow;

const REFERENCE_SEPARATOR: &str = ", ";

/// Merge electrically identical BOM rows. Groups keep the order in which
/// their key first appears.
pub fn aggregate(rows: Vec<BomRow>) -> Vec<BomRow> {
    let mut groups: Vec<BomRow> = Vec::with_capacity(rows.len());
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();

    for row in rows {
        let key = (row.value.clone(), row.footprint.clone(), row.part_number.clone());
        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                if !row.reference.is_empty() {
                    if !group.reference.is_empty() {
                        group.reference.push_str(REFERENCE_SEPARATOR);
                    }
                    group.reference.push_str(&row.reference);
                }
                group.quantity = group.quantity.saturating_add(row.quantity);
            }
            None => {
                index.insert(key, groups.len());
                groups.push(row);
            }
        }
    }

    tracing::debug!("Grouped BOM into {} lines", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_identical_components() {
        let rows = vec![
            BomRow::new("R1", 1, "10k", "0603", "MPN1"),
            BomRow::new("R2", 1, "10k", "0603", "MPN1"),
            BomRow::new("R3", 1, "1k", "0603", "MPN2"),
        ];

        let grouped = aggregate(rows);

        assert_eq!(
            grouped,
            vec![
                BomRow::new("R1, R2", 2, "10k", "0603", "MPN1"),
                BomRow::new("R3", 1, "1k", "0603", "MPN2"),
            ]
        );
    }

    #[test]
    fn test_order_follows_first_occurrence() {
        let rows = vec![
            BomRow::new("C1", 1, "100n", "0402", ""),
            BomRow::new("R1", 1, "10k", "0603", ""),
            BomRow::new("C2", 1, "100n", "0402", ""),
        ];

        let grouped = aggregate(rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].reference, "C1, C2");
        assert_eq!(grouped[1].reference, "R1");
    }

    #[test]
    fn test_sums_existing_quantities() {
        let rows = vec![
            BomRow::new("R1, R2", 2, "10k", "0603", "MPN1"),
            BomRow::new("R5", 1, "10k", "0603", "MPN1"),
        ];

        let grouped = aggregate(rows);

        assert_eq!(grouped[0].quantity, 3);
        assert_eq!(grouped[0].reference, "R1, R2, R5");
    }

    #[test]
    fn test_part_number_distinguishes_groups() {
        let rows = vec![
            BomRow::new("R1", 1, "10k", "0603", "MPN1"),
            BomRow::new("R2", 1, "10k", "0603", "MPN9"),
        ];

        assert_eq!(aggregate(rows).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
