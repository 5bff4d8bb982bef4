//! Synthetic value reconstruction for missing or inconsistent cells.
//!
//! Every synthesized value comes from a seeded `StdRng` injected by the
//! pipeline, so a file ingested twice under the same master seed reconstructs
//! the exact same series. The formulas aim for "plausible and
//! invariant-satisfying", not for any statistical model.

use rand::rngs::StdRng;
use rand::Rng;

/// Default close when a row has no usable price at all.
pub const DEFAULT_PRICE: f64 = 100.0;

/// Opening-gap magnitude around the anchor price.
const OPEN_GAP: f64 = 0.03;
/// Maximum high/low extension beyond the open/close range.
const RANGE_EXTENSION: f64 = 0.02;
/// Synthetic volume bounds before volatility scaling.
const VOLUME_MIN: u64 = 50_000;
const VOLUME_MAX: u64 = 500_000;
/// How strongly realized volatility scales synthetic volume.
const VOLUME_VOL_SCALE: f64 = 10.0;

/// Seeded generator for reconstructed fields.
#[derive(Debug)]
pub struct GapFill {
    rng: StdRng,
}

impl GapFill {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Synthesize an open near the anchor (previous close when available).
    pub fn opening_price(&mut self, anchor: f64) -> f64 {
        anchor * (1.0 + self.rng.gen_range(-OPEN_GAP..OPEN_GAP))
    }

    /// High above the open/close range: `base * (1 + U(0, ext))`.
    pub fn high_above(&mut self, base: f64) -> f64 {
        base * (1.0 + self.rng.gen_range(0.0..RANGE_EXTENSION))
    }

    /// Low below the open/close range: `base * (1 - U(0, ext))`.
    pub fn low_below(&mut self, base: f64) -> f64 {
        base * (1.0 - self.rng.gen_range(0.0..RANGE_EXTENSION))
    }

    /// Synthetic volume, scaled up with the day's realized volatility so
    /// fabricated series don't look uniform.
    pub fn volume(&mut self, volatility: f64) -> u64 {
        let base = self.rng.gen_range(VOLUME_MIN..VOLUME_MAX);
        let scale = 1.0 + VOLUME_VOL_SCALE * volatility.max(0.0);
        ((base as f64) * scale) as u64
    }

    /// Average lot size used to derive a trade count from volume.
    pub fn lot_size(&mut self) -> u64 {
        self.rng.gen_range(50..200)
    }

    /// 52-week bands around the close, clamped so high >= close >= low.
    pub fn bands_52w(&mut self, close: f64) -> (f64, f64) {
        let high = close / self.rng.gen_range(0.7..1.0);
        let low = close / self.rng.gen_range(1.0..1.5);
        (high.max(close), low.min(close))
    }
}
