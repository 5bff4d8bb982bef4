//! Property tests for the parsing and reconciliation invariants.
//!
//! Uses proptest to verify:
//! 1. Reconciliation output always satisfies containment, positivity, and
//!    date ordering, no matter what the input cells contain
//! 2. Reconciliation is deterministic under a fixed seed
//! 3. Formatted numbers parse back to the same value
//! 4. Similarity is symmetric and bounded to [0, 1]
//! 5. Column mapping is a pure function of the header row
//! 6. The cell parsers are total: any input yields a bounded confidence

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sheetlab_core::domain::{CanonicalRow, RawCell};
use sheetlab_core::ingest::{reconcile_table, GapFill, RawTable};
use sheetlab_core::mapping::{similarity, ColumnMapper};
use sheetlab_core::parse::{format_number, parse_date, parse_number, NumberContext};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_cell() -> impl Strategy<Value = RawCell> {
    prop_oneof![
        1 => Just(RawCell::Empty),
        3 => (-1.0e6..1.0e6f64).prop_map(RawCell::Number),
        3 => "[ -~]{0,12}".prop_map(|s| RawCell::from_text(&s)),
    ]
}

fn arb_table() -> impl Strategy<Value = RawTable> {
    let headers = ["Date", "OPEN", "HIGH", "LOW", "close", "Volume"];
    prop::collection::vec(prop::collection::vec(arb_cell(), headers.len()), 1..20).prop_map(
        move |rows| RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        },
    )
}

fn reconcile(table: &RawTable, seed: u64) -> Vec<CanonicalRow> {
    let mapper = ColumnMapper::default();
    let mapping = mapper.map_columns(&table.headers);
    let mut fill = GapFill::new(StdRng::seed_from_u64(seed));
    reconcile_table(table, &mapping, &mut fill).0
}

// ── 1 + 2. Reconciliation invariants and determinism ─────────────────

proptest! {
    /// Whatever the cells contain, every reconciled row is sane and the
    /// output is date-ascending with prev_close chained to the prior close.
    #[test]
    fn reconciled_rows_always_satisfy_invariants(table in arb_table(), seed in any::<u64>()) {
        let rows = reconcile(&table, seed);
        prop_assert_eq!(rows.len(), table.rows.len());

        for row in &rows {
            prop_assert!(row.is_sane(), "row failed invariants: {:?}", row);
        }
        for pair in rows.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
            // No prev-close column in the header set, so chaining holds.
            prop_assert_eq!(pair[1].prev_close, pair[0].close);
        }
    }

    /// The same table under the same seed reconstructs bit-identically.
    #[test]
    fn reconciliation_is_deterministic(table in arb_table(), seed in any::<u64>()) {
        let a = reconcile(&table, seed);
        let b = reconcile(&table, seed);
        prop_assert_eq!(a, b);
    }
}

// ── 3. Number format round-trip ──────────────────────────────────────

proptest! {
    /// A price formatted by the library parses back to the same value.
    #[test]
    fn price_format_roundtrip(raw in 0.01..1.0e7f64) {
        let value = (raw * 100.0).round() / 100.0;
        let text = format_number(value, NumberContext::Price);
        let parsed = parse_number(&RawCell::from_text(&text), NumberContext::Price);
        prop_assert!(parsed.valid, "'{}' did not parse", text);
        prop_assert!((parsed.value - value).abs() < 1e-9);
    }

    /// A volume formatted by the library parses back to the same integer.
    #[test]
    fn volume_format_roundtrip(value in 1u64..1_000_000_000u64) {
        let text = format_number(value as f64, NumberContext::Volume);
        let parsed = parse_number(&RawCell::from_text(&text), NumberContext::Volume);
        prop_assert!(parsed.valid);
        prop_assert_eq!(parsed.value, value as f64);
    }
}

// ── 4. Similarity bounds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn similarity_is_bounded_and_symmetric(a in "[ -~]{0,16}", b in "[ -~]{0,16}") {
        let ab = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ab), "similarity out of bounds: {}", ab);
        prop_assert_eq!(ab, similarity(&b, &a));
    }

    #[test]
    fn similarity_of_identical_strings_is_one(a in "[ -~]{1,16}") {
        prop_assert_eq!(similarity(&a, &a), 1.0);
    }
}

// ── 5. Mapping purity ────────────────────────────────────────────────

proptest! {
    /// Mapping the same headers twice yields identical results, and every
    /// reported confidence stays within [0, 1].
    #[test]
    fn mapping_is_pure(headers in prop::collection::vec("[ -~]{1,15}", 1..8)) {
        let mapper = ColumnMapper::default();
        let a = mapper.map_columns(&headers);
        let b = mapper.map_columns(&headers);

        prop_assert_eq!(a.confidence, b.confidence);
        prop_assert!((0.0..=1.0).contains(&a.confidence));
        for (ma, mb) in a.mappings.iter().zip(&b.mappings) {
            prop_assert_eq!(&ma.header, &mb.header);
            prop_assert_eq!(ma.confidence, mb.confidence);
            prop_assert!((0.0..=1.0).contains(&ma.confidence));
        }
    }
}

// ── 6. Parser totality ───────────────────────────────────────────────

proptest! {
    /// The number parser never panics and always reports a bounded confidence.
    #[test]
    fn parse_number_is_total(cell in arb_cell()) {
        for ctx in [NumberContext::Price, NumberContext::Volume, NumberContext::Percentage] {
            let parsed = parse_number(&cell, ctx);
            prop_assert!((0.0..=1.0).contains(&parsed.confidence));
            if parsed.valid {
                prop_assert!(parsed.value.is_finite());
            }
        }
    }

    /// The date parser never panics; valid parses carry positive confidence.
    #[test]
    fn parse_date_is_total(cell in arb_cell()) {
        let parsed = parse_date(&cell);
        prop_assert!((0.0..=1.0).contains(&parsed.confidence));
        if parsed.valid {
            prop_assert!(parsed.confidence > 0.0);
        } else {
            prop_assert_eq!(parsed.confidence, 0.0);
        }
    }
}
