//! CanonicalSeries — the ordered output of one successful ingest.
//!
//! Rows are sorted ascending by trading date at construction and never
//! mutated afterwards; downstream consumers (charting, indicators, the
//! snapshot exporter) rely on that ordering.

use super::row::CanonicalRow;
use chrono::NaiveDate;
use serde::Serialize;

/// Date-ascending sequence of canonical rows. Built once per ingest and
/// replaced wholesale on the next one.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalSeries {
    rows: Vec<CanonicalRow>,
}

impl CanonicalSeries {
    /// Build a series, sorting rows ascending by date (stable).
    pub fn from_rows(mut rows: Vec<CanonicalRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRow> {
        self.rows.iter()
    }

    /// Close prices in date order, for indicator computation.
    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// The trailing `n` rows (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[CanonicalRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}

impl<'a> IntoIterator for &'a CanonicalSeries {
    type Item = &'a CanonicalRow;
    type IntoIter = std::slice::Iter<'a, CanonicalRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, close: f64) -> CanonicalRow {
        CanonicalRow {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            series: "EQ".into(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            prev_close: close - 1.0,
            ltp: close,
            close,
            vwap: close - 0.5,
            high_52w: close * 1.2,
            low_52w: close * 0.8,
            volume: 1000,
            value: close * 1000.0,
            trades: 10,
        }
    }

    #[test]
    fn from_rows_sorts_by_date() {
        let series = CanonicalSeries::from_rows(vec![
            row("2025-07-14", 103.0),
            row("2025-07-11", 101.0),
            row("2025-07-15", 104.0),
        ]);

        let dates: Vec<_> = series.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-07-11", "2025-07-14", "2025-07-15"]);
        assert_eq!(series.first_date().unwrap().to_string(), "2025-07-11");
        assert_eq!(series.last_date().unwrap().to_string(), "2025-07-15");
    }

    #[test]
    fn closes_follow_date_order() {
        let series = CanonicalSeries::from_rows(vec![
            row("2025-07-14", 103.0),
            row("2025-07-11", 101.0),
        ]);
        assert_eq!(series.closes(), vec![101.0, 103.0]);
    }

    #[test]
    fn tail_clamps_to_length() {
        let series = CanonicalSeries::from_rows(vec![
            row("2025-07-11", 101.0),
            row("2025-07-14", 103.0),
        ]);
        assert_eq!(series.tail(5).len(), 2);
        assert_eq!(series.tail(1)[0].close, 103.0);
    }
}
