//! Moving Average Convergence Divergence (MACD).
//!
//! Line: EMA(fast) - EMA(slow) of closes. Signal: EMA(signal_period) of the
//! line. Histogram: line - signal. Exposed as three named instances over the
//! single-series trait; the conventional parameters are 12/26/9.
//!
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal and
//! histogram.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::CanonicalRow;

/// Which output of the MACD stack to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
    name: String,
}

impl Macd {
    fn build(fast: usize, slow: usize, signal: usize, output: MacdOutput, tag: &str) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be shorter than slow");
        Self {
            fast,
            slow,
            signal,
            output,
            name: format!("macd_{tag}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdOutput::Line, "line")
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdOutput::Signal, "signal")
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdOutput::Histogram, "histogram")
    }

    fn line_series(&self, closes: &[f64]) -> Vec<f64> {
        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }

    /// EMA of the line, skipping the line's NaN warmup so the seed window
    /// starts at the first finite value.
    fn signal_series(&self, line: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; line.len()];
        if let Some(start) = line.iter().position(|v| !v.is_nan()) {
            let smoothed = ema_of_series(&line[start..], self.signal);
            for (i, v) in smoothed.into_iter().enumerate() {
                result[start + i] = v;
            }
        }
        result
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdOutput::Line => self.slow - 1,
            MacdOutput::Signal | MacdOutput::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, rows: &[CanonicalRow]) -> Vec<f64> {
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let line = self.line_series(&closes);
        match self.output {
            MacdOutput::Line => line,
            MacdOutput::Signal => self.signal_series(&line),
            MacdOutput::Histogram => {
                let signal = self.signal_series(&line);
                line.iter().zip(&signal).map(|(l, s)| l - s).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_rows, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_line_warmup_matches_slow_period() {
        let rows = make_rows(&ramp(10));
        let macd = Macd::line(3, 6, 4);
        let result = macd.compute(&rows);
        assert!(result[..5].iter().all(|v| v.is_nan()));
        assert!(!result[5].is_nan());
    }

    #[test]
    fn macd_line_positive_in_uptrend() {
        // Fast EMA sits above slow EMA when closes rise steadily.
        let rows = make_rows(&ramp(20));
        let result = Macd::line(3, 6, 4).compute(&rows);
        assert!(result[10] > 0.0);
        assert!(result[19] > 0.0);
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let rows = make_rows(&[100.0; 15]);
        let line = Macd::line(3, 6, 4).compute(&rows);
        let hist = Macd::histogram(3, 6, 4).compute(&rows);
        assert_approx(line[10], 0.0, DEFAULT_EPSILON);
        assert_approx(hist[10], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let rows = make_rows(&[
            100.0, 102.0, 101.0, 104.0, 103.0, 107.0, 106.0, 110.0, 108.0, 112.0, 111.0, 115.0,
        ]);
        let line = Macd::line(3, 6, 4).compute(&rows);
        let signal = Macd::signal(3, 6, 4).compute(&rows);
        let hist = Macd::histogram(3, 6, 4).compute(&rows);
        for i in 0..rows.len() {
            if !hist[i].is_nan() {
                assert_approx(hist[i], line[i] - signal[i], DEFAULT_EPSILON);
            }
        }
    }

    #[test]
    fn macd_signal_warmup() {
        let rows = make_rows(&ramp(15));
        let signal = Macd::signal(3, 6, 4).compute(&rows);
        // Line valid from index 5; signal needs 4 line values → index 8.
        assert!(signal[..8].iter().all(|v| v.is_nan()));
        assert!(!signal[8].is_nan());
        assert_eq!(Macd::signal(3, 6, 4).lookback(), 8);
    }

    #[test]
    fn macd_rejects_inverted_periods() {
        let result = std::panic::catch_unwind(|| Macd::line(26, 12, 9));
        assert!(result.is_err());
    }
}
