//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices. Lookback: period - 1.

use super::Indicator;
use crate::domain::CanonicalRow;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, rows: &[CanonicalRow]) -> Vec<f64> {
        let n = rows.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &rows[(i + 1 - self.period)..=i];
            if window.iter().any(|r| r.close.is_nan()) {
                continue;
            }
            let sum: f64 = window.iter().map(|r| r.close).sum();
            result[i] = sum / self.period as f64;
        }

        result
    }
}
