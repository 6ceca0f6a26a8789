//! Property tests for the value normalization laws

use fabprep::canonical::{normalize_rotation, round_coordinate};
use fabprep::schema::{canonical_field_for, AliasRegistry};
use fabprep::{Layer, TableKind};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

proptest! {
    #[test]
    fn rotation_is_always_in_range(degrees in -100_000.0f64..100_000.0) {
        let rotation = normalize_rotation(degrees).expect("finite input");
        prop_assert!(rotation < 360);
    }

    #[test]
    fn rotation_in_range_passes_through(whole in 0u16..360, frac in 0.0f64..0.99) {
        let degrees = whole as f64 + frac;
        prop_assert_eq!(normalize_rotation(degrees), Some(whole));
    }

    #[test]
    fn layer_is_top_unless_bottom(side in "\\PC{0,12}") {
        let layer = Layer::from_side(&side);
        if side.trim().eq_ignore_ascii_case("bottom") {
            prop_assert_eq!(layer, Layer::Bottom);
        } else {
            prop_assert_eq!(layer, Layer::Top);
        }
    }

    #[test]
    fn layer_ignores_case_and_padding(upper in proptest::bool::ANY, pad in 0usize..4) {
        let word = if upper { "BOTTOM" } else { "Bottom" };
        let side = format!("{}{}{}", " ".repeat(pad), word, " ".repeat(pad));
        prop_assert_eq!(Layer::from_side(&side), Layer::Bottom);
    }

    #[test]
    fn rounding_is_idempotent(mantissa in -10_000_000i64..10_000_000, scale in 0u32..7, precision in 0u32..5) {
        let value = Decimal::new(mantissa, scale);
        let once = round_coordinate(value, precision);
        prop_assert_eq!(round_coordinate(once, precision), once);
    }

    #[test]
    fn formatted_coordinate_reparses(mantissa in -10_000_000i64..10_000_000, scale in 0u32..7) {
        let once = round_coordinate(Decimal::new(mantissa, scale), 2);
        let rendered = format!("{}mm", once);
        let reparsed = Decimal::from_str(rendered.trim_end_matches("mm")).unwrap();
        prop_assert_eq!(round_coordinate(reparsed, 2).to_string(), once.to_string());
    }
}

#[test]
fn rotation_minus_ninety_is_270() {
    assert_eq!(normalize_rotation(-90.0), Some(270));
}

#[test]
fn every_alias_spelling_variant_resolves() {
    for kind in TableKind::all() {
        for (field, spellings) in AliasRegistry::for_kind(kind).fields() {
            for spelling in spellings {
                let variants = [
                    spelling.to_string(),
                    spelling.to_uppercase(),
                    format!("  {}  ", spelling),
                    format!("\"{}\"", spelling),
                    spelling
                        .chars()
                        .enumerate()
                        .flat_map(|(i, c)| if i == 1 { vec!['_', c] } else { vec![c] })
                        .collect::<String>(),
                ];
                for variant in &variants {
                    assert_eq!(
                        canonical_field_for(kind, variant),
                        Some(field),
                        "{:?} should resolve to {}",
                        variant,
                        field
                    );
                }
            }
        }
    }
}
