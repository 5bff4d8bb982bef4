//! CanonicalRow — the normalized daily record.
//!
//! Serde renames carry the external contract field names (`Date`, `OPEN`,
//! `PREV. CLOSE`, `52W H`, ...) so consumers of serialized rows see the
//! tabular-market-data convention the presentation layer was written against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized trading day after reconciliation.
///
/// Every row produced by the pipeline satisfies [`CanonicalRow::is_contained`]
/// and [`CanonicalRow::is_positive`]; parsed input that violates either is
/// treated as missing and reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "series")]
    pub series: String,
    #[serde(rename = "OPEN")]
    pub open: f64,
    #[serde(rename = "HIGH")]
    pub high: f64,
    #[serde(rename = "LOW")]
    pub low: f64,
    #[serde(rename = "PREV. CLOSE")]
    pub prev_close: f64,
    #[serde(rename = "ltp")]
    pub ltp: f64,
    #[serde(rename = "close")]
    pub close: f64,
    #[serde(rename = "vwap")]
    pub vwap: f64,
    #[serde(rename = "52W H")]
    pub high_52w: f64,
    #[serde(rename = "52W L")]
    pub low_52w: f64,
    #[serde(rename = "VOLUME")]
    pub volume: u64,
    #[serde(rename = "VALUE")]
    pub value: f64,
    #[serde(rename = "No of trades")]
    pub trades: u64,
}

impl CanonicalRow {
    /// Price-range containment: high >= max(open, close), low <= min(open, close).
    pub fn is_contained(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }

    /// All price fields strictly positive, volume and trade count >= 1.
    pub fn is_positive(&self) -> bool {
        self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
            && self.ltp > 0.0
            && self.prev_close > 0.0
            && self.vwap > 0.0
            && self.volume >= 1
            && self.trades >= 1
    }

    /// Full row-level sanity check used by the pipeline's output assertions.
    pub fn is_sane(&self) -> bool {
        self.is_contained() && self.is_positive()
    }
}
