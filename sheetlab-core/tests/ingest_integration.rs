//! End-to-end ingest tests over real files on disk.
//!
//! Covers:
//! 1. A full NSE-style export with every canonical column and mixed formats
//! 2. Sparse files: warnings plus a still-sane reconstructed series
//! 3. Determinism: same file + seed reproduces the series exactly
//! 4. Format coverage: delimiters, date literals, grouped numbers
//! 5. The failure gates: row minimum, size ceiling, unsupported types

use sheetlab_core::ingest::{IngestError, IngestOptions, Ingestor, ReadError};
use sheetlab_core::mapping::MappingIssue;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_file(name: &str, content: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path =
        std::env::temp_dir().join(format!("sheetlab_it_{}_{id}_{name}", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

fn ingestor(seed: u64) -> Ingestor {
    Ingestor::new(IngestOptions {
        master_seed: seed,
        ..Default::default()
    })
}

/// A bhavcopy-style export: every canonical column, currency symbols,
/// South-Asian grouping, and `DD-MMM-YYYY` dates.
fn nse_style_csv() -> String {
    let mut out = String::from(
        "Date,series,OPEN,HIGH,LOW,PREV. CLOSE,ltp,close,vwap,52W H,52W L,VOLUME,VALUE,No of trades\n",
    );
    let days = [
        ("01-Jul-2025", 100.0),
        ("02-Jul-2025", 101.5),
        ("03-Jul-2025", 99.8),
        ("04-Jul-2025", 102.2),
        ("07-Jul-2025", 103.0),
        ("08-Jul-2025", 101.9),
        ("09-Jul-2025", 104.4),
        ("10-Jul-2025", 105.1),
        ("11-Jul-2025", 104.0),
        ("14-Jul-2025", 106.3),
        ("15-Jul-2025", 107.0),
        ("16-Jul-2025", 106.1),
    ];
    let mut prev: f64 = 99.0;
    for (date, close) in days {
        let open = prev;
        let high = open.max(close) + 1.0;
        let low = open.min(close) - 1.0;
        out.push_str(&format!(
            "{date},EQ,₹{open:.2},{high:.2},{low:.2},{prev:.2},{close:.2},{close:.2},{:.2},150.00,80.00,\"12,34,567\",\"1,27,20,000.00\",4521\n",
            (high + low + 2.0 * close) / 4.0,
        ));
        prev = close;
    }
    out
}

#[test]
fn full_nse_export_roundtrips() {
    let path = temp_file("nse.csv", &nse_style_csv());
    let outcome = ingestor(42).ingest(&path).unwrap();

    assert_eq!(outcome.series.len(), 12);
    assert_eq!(outcome.series.first_date().unwrap().to_string(), "2025-07-01");
    assert_eq!(outcome.series.last_date().unwrap().to_string(), "2025-07-16");

    for row in &outcome.series {
        assert!(row.is_sane(), "row failed invariants: {row:?}");
        assert_eq!(row.series, "EQ");
    }

    // Parsed values survive untouched.
    let first = &outcome.series.rows()[0];
    assert_eq!(first.close, 100.0);
    assert_eq!(first.open, 99.0);
    assert_eq!(first.volume, 1_234_567);
    assert_eq!(first.trades, 4521);
    assert_eq!(first.high_52w, 150.0);

    // Every required field mapped exactly.
    assert!(outcome.diagnostics.mapping.confidence > 0.9);
    assert!(!outcome
        .diagnostics
        .issues
        .iter()
        .any(|i| matches!(i, MappingIssue::RequiredUnmapped { .. })));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn every_row_satisfies_invariants_even_when_input_is_hostile() {
    // Broken highs, negative prices, garbage dates, missing cells.
    let csv = "\
Date,OPEN,HIGH,LOW,close,Volume
2025-07-01,100,90,98,103,5000
2025-07-02,-50,105,98,103,5000
not a date,100,105,120,103,-1
2025-07-04,,,,,
2025-07-07,100,105,98,,5000
2025-07-08,100,105,98,103,5000
2025-07-09,100,105,98,103,5000
2025-07-10,100,105,98,103,5000
2025-07-11,100,105,98,103,5000
2025-07-14,100,105,98,103,5000
";
    let path = temp_file("hostile.csv", csv);
    let outcome = ingestor(42).ingest(&path).unwrap();

    assert_eq!(outcome.series.len(), 10);
    for row in &outcome.series {
        assert!(row.is_sane(), "row failed invariants: {row:?}");
    }

    // Dates stay ascending after placeholder substitution.
    let dates: Vec<_> = outcome.series.iter().map(|r| r.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(outcome.diagnostics.substitutions.dates_substituted, 1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_close_defaults_to_open() {
    let mut csv = String::from("Date,OPEN,HIGH,LOW,close,Volume\n");
    for i in 1..=10 {
        // Row 5 has no close.
        let close = if i == 5 { String::new() } else { format!("{}", 100 + i) };
        csv.push_str(&format!("2025-07-{i:02},{},{},{},{close},5000\n", 90 + i, 110 + i, 85 + i));
    }
    let path = temp_file("noclose.csv", &csv);
    let outcome = ingestor(42).ingest(&path).unwrap();

    let row = &outcome.series.rows()[4];
    assert_eq!(row.close, row.open);
    assert_eq!(row.close, 95.0);
    assert_eq!(outcome.diagnostics.substitutions.closes_defaulted, 1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn prev_close_chains_when_column_absent() {
    let mut csv = String::from("Date,OPEN,HIGH,LOW,close,Volume\n");
    for i in 1..=10 {
        let close = 100 + i;
        csv.push_str(&format!("2025-07-{i:02},{close},{},{},{close},5000\n", close + 2, close - 2));
    }
    let path = temp_file("chain.csv", &csv);
    let outcome = ingestor(42).ingest(&path).unwrap();

    let rows = outcome.series.rows();
    for i in 1..rows.len() {
        assert_eq!(rows[i].prev_close, rows[i - 1].close);
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn same_seed_is_bit_identical_different_seed_is_not() {
    // Sparse enough that synthesis kicks in everywhere.
    let mut csv = String::from("Date,close\n");
    for i in 1..=12 {
        csv.push_str(&format!("2025-07-{i:02},{}\n", 100 + i));
    }
    let path = temp_file("sparse.csv", &csv);

    let a = ingestor(42).ingest(&path).unwrap();
    let b = ingestor(42).ingest(&path).unwrap();
    assert_eq!(a.series.rows(), b.series.rows());

    let c = ingestor(7).ingest(&path).unwrap();
    assert_ne!(a.series.rows(), c.series.rows());

    // Synthesis never broke the invariants under either seed.
    for row in a.series.iter().chain(c.series.iter()) {
        assert!(row.is_sane());
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn tab_separated_txt_ingests() {
    let mut txt = String::from("Date\tOPEN\tHIGH\tLOW\tclose\tVolume\n");
    for i in 1..=10 {
        let c = 100 + i;
        txt.push_str(&format!("2025-07-{i:02}\t{c}\t{}\t{}\t{c}\t5000\n", c + 2, c - 2));
    }
    let path = temp_file("data.txt", &txt);
    let outcome = ingestor(42).ingest(&path).unwrap();
    assert_eq!(outcome.series.len(), 10);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn mixed_date_formats_agree() {
    // Four spellings of dates in one column, all resolving structurally.
    let csv = "\
Date,OPEN,HIGH,LOW,close,Volume
11-Jul-25,100,105,98,103,5000
14-Jul-2025,100,105,98,103,5000
2025-07-15,100,105,98,103,5000
16/07/2025,100,105,98,103,5000
2025-07-17,100,105,98,103,5000
2025-07-18,100,105,98,103,5000
2025-07-21,100,105,98,103,5000
2025-07-22,100,105,98,103,5000
2025-07-23,100,105,98,103,5000
2025-07-24,100,105,98,103,5000
";
    let path = temp_file("dates.csv", csv);
    let outcome = ingestor(42).ingest(&path).unwrap();

    let dates: Vec<String> = outcome.series.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates[0], "2025-07-11");
    assert_eq!(dates[1], "2025-07-14");
    assert_eq!(dates[2], "2025-07-15");
    assert_eq!(dates[3], "2025-07-16");
    assert_eq!(outcome.diagnostics.substitutions.dates_substituted, 0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn fuzzy_headers_map_with_warnings_not_failures() {
    let mut csv = String::from("Trade Date,Open Prices,Dayy High,Day Low,Closng Price,Traded Qty\n");
    for i in 1..=10 {
        let c = 100 + i;
        csv.push_str(&format!("2025-07-{i:02},{c},{},{},{c},5000\n", c + 2, c - 2));
    }
    let path = temp_file("fuzzy.csv", &csv);
    let outcome = ingestor(42).ingest(&path).unwrap();

    assert_eq!(outcome.series.len(), 10);
    assert!(outcome.series.iter().all(|r| r.is_sane()));
    // Fuzzy matches score below exact ones.
    assert!(outcome.diagnostics.mapping.confidence < 1.0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn too_few_rows_is_rejected() {
    let csv = "Date,OPEN,HIGH,LOW,close,Volume\n2025-07-11,100,105,98,103,5000\n";
    let path = temp_file("tiny.csv", csv);
    let err = ingestor(42).ingest(&path).unwrap_err();
    assert!(matches!(err, IngestError::TooFewRows { got: 1, need: 10 }));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn header_only_file_is_rejected() {
    let path = temp_file("empty.csv", "Date,OPEN,HIGH,LOW,close,Volume\n");
    let err = ingestor(42).ingest(&path).unwrap_err();
    assert!(matches!(err, IngestError::Read(ReadError::Empty)));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn unsupported_extension_is_rejected() {
    let path = temp_file("data.parquet", "whatever");
    let err = ingestor(42).ingest(&path).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Read(ReadError::UnsupportedExtension(_))
    ));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn outlier_close_is_flagged_in_diagnostics() {
    let mut csv = String::from("Date,OPEN,HIGH,LOW,close,Volume\n");
    for i in 1..=10 {
        let close = if i == 9 { 1000.0 } else { 100.0 + i as f64 };
        csv.push_str(&format!(
            "2025-07-{i:02},{close},{},{},{close},5000\n",
            close + 2.0,
            close - 2.0
        ));
    }
    let path = temp_file("outlier.csv", &csv);
    let outcome = ingestor(42).ingest(&path).unwrap();
    assert_eq!(outcome.diagnostics.close_stats.outliers, vec![1000.0]);
    let _ = std::fs::remove_file(&path);
}
