//! Analysis snapshot export.
//!
//! A snapshot is the JSON document the dashboard hands to external consumers:
//! ingest provenance, the latest reading of each stock indicator, and the
//! trailing rows of the series. Indicator warmup NaNs become `null` rather
//! than leaking non-standard JSON numbers.

use crate::domain::CanonicalRow;
use crate::indicators::{Bollinger, Ema, Indicator, Macd, Rsi, Sma};
use crate::ingest::IngestOutcome;
use chrono::NaiveDate;
use serde::Serialize;

/// Latest value of one indicator, `None` while still warming up.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReading {
    pub name: String,
    pub value: Option<f64>,
}

/// Exported view of one ingested series.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub row_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub mapping_confidence: f64,
    pub date_gaps: usize,
    pub close_outliers: usize,
    pub indicators: Vec<IndicatorReading>,
    /// Trailing rows, oldest first.
    pub rows: Vec<CanonicalRow>,
}

/// The indicator set every snapshot carries.
fn standard_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Sma::new(20)),
        Box::new(Ema::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::line(12, 26, 9)),
        Box::new(Macd::signal(12, 26, 9)),
        Box::new(Macd::histogram(12, 26, 9)),
        Box::new(Bollinger::upper(20, 2.0)),
        Box::new(Bollinger::middle(20, 2.0)),
        Box::new(Bollinger::lower(20, 2.0)),
    ]
}

impl AnalysisSnapshot {
    /// Build a snapshot from a completed ingest.
    pub fn build(outcome: &IngestOutcome, source: &str, tail: usize) -> Self {
        let series = &outcome.series;
        let rows = series.rows();

        let indicators = standard_indicators()
            .iter()
            .map(|ind| {
                let last = ind.compute(rows).last().copied().unwrap_or(f64::NAN);
                IndicatorReading {
                    name: ind.name().to_string(),
                    value: (!last.is_nan()).then_some(last),
                }
            })
            .collect();

        Self {
            generated_at: chrono::Utc::now(),
            source: source.to_string(),
            row_count: series.len(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            mapping_confidence: outcome.diagnostics.mapping.confidence,
            date_gaps: outcome.diagnostics.dates.gaps.len(),
            close_outliers: outcome.diagnostics.close_stats.outliers.len(),
            indicators,
            rows: series.tail(tail).to_vec(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
