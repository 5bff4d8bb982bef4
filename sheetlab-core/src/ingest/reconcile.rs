//! Row reconciliation: mapped raw cells → invariant-satisfying canonical rows.
//!
//! Reconciliation never rejects a row. Every cell that fails to parse, or
//! parses into something that would break the OHLC containment and positivity
//! invariants, is replaced by a derived or synthesized value. Rows are sorted
//! by resolved date before the second pass so each row's previous close is
//! the close of the chronologically prior row.

use super::fill::{GapFill, DEFAULT_PRICE};
use super::reader::RawTable;
use crate::domain::CanonicalRow;
use crate::mapping::{CanonicalField, MappingResult};
use crate::parse::{parse_date, parse_number, NumberContext, ParsedDate, ParsedNumber};
use chrono::Days;
use serde::Serialize;

/// Substitution counts plus the per-cell parses the pipeline aggregates into
/// batch diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileStats {
    pub rows: usize,
    pub dates_substituted: usize,
    pub opens_synthesized: usize,
    pub ranges_adjusted: usize,
    pub closes_defaulted: usize,
    pub vwaps_derived: usize,
    pub prev_closes_chained: usize,
    pub ltps_defaulted: usize,
    pub volumes_synthesized: usize,
    pub values_derived: usize,
    pub trades_derived: usize,
    pub bands_synthesized: usize,
    pub series_defaulted: usize,
    /// Date parses in file order, for batch diagnostics.
    #[serde(skip)]
    pub parsed_dates: Vec<ParsedDate>,
    /// Close parses in file order, for batch statistics.
    #[serde(skip)]
    pub parsed_closes: Vec<ParsedNumber>,
}

/// Column indices resolved once per table.
struct Columns {
    date: Option<usize>,
    series: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    prev_close: Option<usize>,
    ltp: Option<usize>,
    close: Option<usize>,
    vwap: Option<usize>,
    high_52w: Option<usize>,
    low_52w: Option<usize>,
    volume: Option<usize>,
    value: Option<usize>,
    trades: Option<usize>,
}

impl Columns {
    /// Resolve the column index each field reads from. Fields map
    /// independently, so two can claim one header (PrevClose's substring
    /// match lands on a bare "close" column); here the higher-confidence
    /// claim keeps the column and the loser reads nothing.
    fn resolve(table: &RawTable, mapping: &MappingResult) -> Self {
        let idx = |field| {
            let m = mapping.get(field)?;
            let header = m.header.as_deref()?;
            let outranked = mapping.mappings.iter().any(|o| {
                o.field != field
                    && o.header.as_deref() == Some(header)
                    && o.confidence > m.confidence
            });
            if outranked {
                return None;
            }
            table.column_index(header)
        };
        Self {
            date: idx(CanonicalField::Date),
            series: idx(CanonicalField::Series),
            open: idx(CanonicalField::Open),
            high: idx(CanonicalField::High),
            low: idx(CanonicalField::Low),
            prev_close: idx(CanonicalField::PrevClose),
            ltp: idx(CanonicalField::Ltp),
            close: idx(CanonicalField::Close),
            vwap: idx(CanonicalField::Vwap),
            high_52w: idx(CanonicalField::High52w),
            low_52w: idx(CanonicalField::Low52w),
            volume: idx(CanonicalField::Volume),
            value: idx(CanonicalField::Value),
            trades: idx(CanonicalField::Trades),
        }
    }
}

/// A positive, finite parsed price; anything else is treated as missing.
fn price(p: ParsedNumber) -> Option<f64> {
    (p.valid && p.value.is_finite() && p.value > 0.0).then_some(p.value)
}

/// Reconcile a mapped table into canonical rows.
///
/// Deterministic for a given table, mapping, and gap-fill generator: cells
/// are visited in sorted-date order and the generator is only drawn from
/// when a substitution is needed.
pub fn reconcile_table(
    table: &RawTable,
    mapping: &MappingResult,
    fill: &mut GapFill,
) -> (Vec<CanonicalRow>, ReconcileStats) {
    let cols = Columns::resolve(table, mapping);
    let mut stats = ReconcileStats {
        rows: table.rows.len(),
        ..Default::default()
    };

    let today = chrono::Local::now().date_naive();
    let n = table.rows.len() as u64;

    // Pass 1: resolve a date for every row. Unparseable dates become
    // back-dated placeholders that preserve the file order.
    let mut dated: Vec<(chrono::NaiveDate, usize)> = Vec::with_capacity(table.rows.len());
    for i in 0..table.rows.len() {
        let parsed = parse_date(table.cell(i, cols.date));
        stats.parsed_dates.push(parsed);
        let date = if parsed.valid {
            parsed.date
        } else {
            stats.dates_substituted += 1;
            today - Days::new(n - i as u64)
        };
        dated.push((date, i));
    }
    dated.sort_by_key(|(date, _)| *date);

    // Pass 2: reconcile each row in chronological order.
    let mut rows = Vec::with_capacity(dated.len());
    let mut running_close: Option<f64> = None;

    for (date, i) in dated {
        let num = |col, ctx| parse_number(table.cell(i, col), ctx);

        let p_open = num(cols.open, NumberContext::Price);
        let p_high = num(cols.high, NumberContext::Price);
        let p_low = num(cols.low, NumberContext::Price);
        let p_close = num(cols.close, NumberContext::Price);
        let p_prev = num(cols.prev_close, NumberContext::Price);
        let p_ltp = num(cols.ltp, NumberContext::Price);
        let p_vwap = num(cols.vwap, NumberContext::Price);
        let p_h52 = num(cols.high_52w, NumberContext::Price);
        let p_l52 = num(cols.low_52w, NumberContext::Price);
        let p_volume = num(cols.volume, NumberContext::Volume);
        let p_value = num(cols.value, NumberContext::Price);
        let p_trades = num(cols.trades, NumberContext::Volume);

        stats.parsed_closes.push(p_close);

        // Close anchors everything else.
        let close = match price(p_close) {
            Some(c) => c,
            None => {
                stats.closes_defaulted += 1;
                price(p_open)
                    .or_else(|| price(p_high))
                    .or_else(|| price(p_low))
                    .or(running_close)
                    .unwrap_or(DEFAULT_PRICE)
            }
        };

        let open = match price(p_open) {
            Some(o) => o,
            None => {
                stats.opens_synthesized += 1;
                fill.opening_price(running_close.unwrap_or(close))
            }
        };

        // High and low only survive if they already contain the open/close
        // range; otherwise the range is re-extended around it.
        let hi_base = open.max(close);
        let lo_base = open.min(close);
        let high = match price(p_high).filter(|h| *h >= hi_base) {
            Some(h) => h,
            None => {
                stats.ranges_adjusted += 1;
                fill.high_above(hi_base)
            }
        };
        let low = match price(p_low).filter(|l| *l <= lo_base) {
            Some(l) => l,
            None => {
                stats.ranges_adjusted += 1;
                fill.low_below(lo_base)
            }
        };

        let vwap = match price(p_vwap).filter(|v| (low..=high).contains(v)) {
            Some(v) => v,
            None => {
                stats.vwaps_derived += 1;
                (high + low + 2.0 * close) / 4.0
            }
        };

        let prev_close = match price(p_prev) {
            Some(p) => p,
            None => {
                stats.prev_closes_chained += 1;
                running_close.unwrap_or(open)
            }
        };

        let ltp = match price(p_ltp) {
            Some(l) => l,
            None => {
                stats.ltps_defaulted += 1;
                close
            }
        };

        let volume = match p_volume {
            p if p.valid && p.value >= 1.0 => p.value.round() as u64,
            _ => {
                stats.volumes_synthesized += 1;
                let volatility = (high - low) / close;
                fill.volume(volatility).max(1)
            }
        };

        let value = match price(p_value) {
            Some(v) => v,
            None => {
                stats.values_derived += 1;
                volume as f64 * vwap
            }
        };

        let trades = match p_trades {
            p if p.valid && p.value >= 1.0 => p.value.round() as u64,
            _ => {
                stats.trades_derived += 1;
                (volume / fill.lot_size()).max(1)
            }
        };

        // 52-week bands: parsed values pass through untouched; synthesized
        // ones are clamped so they at least bracket the day's range.
        let (high_52w, low_52w) = match (price(p_h52), price(p_l52)) {
            (Some(h), Some(l)) => (h, l),
            (parsed_h, parsed_l) => {
                stats.bands_synthesized += 1;
                let (h, l) = fill.bands_52w(close);
                (parsed_h.unwrap_or(h.max(high)), parsed_l.unwrap_or(l.min(low)))
            }
        };

        let series = match table.cell(i, cols.series).as_text() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                stats.series_defaulted += 1;
                "EQ".to_string()
            }
        };

        running_close = Some(close);

        rows.push(CanonicalRow {
            date,
            series,
            open,
            high,
            low,
            prev_close,
            ltp,
            close,
            vwap,
            high_52w,
            low_52w,
            volume,
            value,
            trades,
        });
    }

    (rows, stats)
}
