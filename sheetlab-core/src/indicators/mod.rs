//! Technical indicators over a canonical series.
//!
//! Indicators are pure functions: row history in, numeric series out of the
//! same length, with the first `lookback()` values `f64::NAN` (warmup). They
//! are computed once per ingest for the snapshot exporter; nothing here
//! mutates the series.
//!
//! Multi-series indicators (MACD, Bollinger) are exposed as separate named
//! instances per output, keeping the single-series trait unchanged.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::CanonicalRow;

/// Trait for indicators.
///
/// An indicator value at row t may only depend on rows up to and including t;
/// appending rows must never change earlier output.
pub trait Indicator: Send + Sync {
    /// Stable name (e.g., "sma_20", "rsi_14") used as a snapshot key.
    fn name(&self) -> &str;

    /// Number of rows consumed before the first valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series. The result has the same
    /// length as `rows`, NaN through the warmup window.
    fn compute(&self, rows: &[CanonicalRow]) -> Vec<f64>;
}

/// Create synthetic canonical rows from close prices for testing.
#[cfg(test)]
pub fn make_rows(closes: &[f64]) -> Vec<CanonicalRow> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            CanonicalRow {
                date: base_date + chrono::Duration::days(i as i64),
                series: "EQ".to_string(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                prev_close: open,
                ltp: close,
                close,
                vwap: (open + close) / 2.0,
                high_52w: close * 1.2,
                low_52w: close * 0.8,
                volume: 1000,
                value: close * 1000.0,
                trades: 10,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
