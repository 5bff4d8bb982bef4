//! Numeric cell parsing across formatting conventions.
//!
//! Accepts currency prefixes (₹ $ € £ ¥ ₽), standard 3-digit grouping,
//! South-Asian 2/3-digit grouping (12,34,567), scientific notation, and plain
//! decimals. Each family carries a base confidence; context validation
//! (price / volume / percentage plausibility) refines it afterwards.

use serde::Serialize;

/// What kind of quantity a cell is expected to hold. Drives plausibility
/// checks, not parsing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberContext {
    Price,
    Volume,
    Percentage,
}

/// Result of parsing one numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNumber {
    pub value: f64,
    pub valid: bool,
    pub confidence: f64,
}

impl ParsedNumber {
    fn invalid() -> Self {
        Self {
            value: 0.0,
            valid: false,
            confidence: 0.0,
        }
    }
}

const CURRENCY_SYMBOLS: [char; 6] = ['₹', '$', '€', '£', '¥', '₽'];

// Base confidence per numeric family, most specific first.
const CONF_GROUPED_STANDARD: f64 = 0.9;
const CONF_GROUPED_SOUTH_ASIAN: f64 = 0.85;
const CONF_SCIENTIFIC: f64 = 0.8;
const CONF_PLAIN: f64 = 0.7;
const CONF_FALLBACK_FACTOR: f64 = 0.3;

/// Parse a raw cell in the given context.
pub fn parse_number(cell: &crate::domain::RawCell, ctx: NumberContext) -> ParsedNumber {
    use crate::domain::RawCell;

    match cell {
        RawCell::Empty => ParsedNumber::invalid(),
        RawCell::Number(n) => {
            if !n.is_finite() {
                return ParsedNumber::invalid();
            }
            let (factor, valid) = context_factor(*n, ctx);
            ParsedNumber {
                value: *n,
                valid,
                confidence: factor,
            }
        }
        RawCell::Text(s) => parse_text(s, ctx),
    }
}

fn parse_text(raw: &str, ctx: NumberContext) -> ParsedNumber {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return ParsedNumber::invalid();
    }

    let base = if is_grouped_standard(&cleaned) {
        Some(CONF_GROUPED_STANDARD)
    } else if is_grouped_south_asian(&cleaned) {
        Some(CONF_GROUPED_SOUTH_ASIAN)
    } else if is_scientific(&cleaned) {
        Some(CONF_SCIENTIFIC)
    } else if is_plain_decimal(&cleaned) {
        Some(CONF_PLAIN)
    } else {
        None
    };

    let degrouped = cleaned.replace(',', "");
    let parsed: Option<f64> = degrouped.parse().ok().filter(|v: &f64| v.is_finite());

    match (base, parsed) {
        (Some(base), Some(value)) => {
            let (factor, valid) = context_factor(value, ctx);
            ParsedNumber {
                value,
                valid,
                confidence: base * factor,
            }
        }
        // No family matched but the string still parses: best-effort result
        // at a fraction of the context confidence.
        (None, Some(value)) => {
            let (factor, valid) = context_factor(value, ctx);
            ParsedNumber {
                value,
                valid,
                confidence: CONF_FALLBACK_FACTOR * factor,
            }
        }
        _ => ParsedNumber::invalid(),
    }
}

/// Strip currency symbols, a trailing percent sign, and whitespace.
fn clean(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
        .collect();
    if s.ends_with('%') {
        s.pop();
    }
    s
}

fn split_sign(s: &str) -> &str {
    s.strip_prefix('-').or_else(|| s.strip_prefix('+')).unwrap_or(s)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `1,234,567.89` — leading chunk of 1-3 digits, then 3-digit chunks.
fn is_grouped_standard(s: &str) -> bool {
    let s = split_sign(s);
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if frac.is_some_and(|f| !all_digits(f)) {
        return false;
    }
    let chunks: Vec<&str> = int_part.split(',').collect();
    if chunks.len() < 2 {
        return false;
    }
    let first_ok = !chunks[0].is_empty() && chunks[0].len() <= 3 && all_digits(chunks[0]);
    first_ok && chunks[1..].iter().all(|c| c.len() == 3 && all_digits(c))
}

/// `12,34,567.89` — trailing chunk of 3, inner chunks of 2, head of 1-2.
fn is_grouped_south_asian(s: &str) -> bool {
    let s = split_sign(s);
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if frac.is_some_and(|f| !all_digits(f)) {
        return false;
    }
    let chunks: Vec<&str> = int_part.split(',').collect();
    if chunks.len() < 2 {
        return false;
    }
    let Some((last, rest)) = chunks.split_last() else {
        return false;
    };
    if last.len() != 3 || !all_digits(last) {
        return false;
    }
    let head_ok = !rest[0].is_empty() && rest[0].len() <= 2 && all_digits(rest[0]);
    head_ok && rest[1..].iter().all(|c| c.len() == 2 && all_digits(c))
}

/// `1.2e5`, `3E-2` — mantissa and exponent both plain numbers.
fn is_scientific(s: &str) -> bool {
    let s = split_sign(s);
    let Some(pos) = s.find(['e', 'E']) else {
        return false;
    };
    let (mantissa, exp) = (&s[..pos], &s[pos + 1..]);
    is_plain_decimal(split_sign(mantissa)) && all_digits(split_sign(exp))
}

/// `1234` or `1234.56` — digits with an optional single decimal point.
fn is_plain_decimal(s: &str) -> bool {
    let s = split_sign(s);
    match s.split_once('.') {
        Some((i, f)) => all_digits(i) && all_digits(f),
        None => all_digits(s),
    }
}

/// Plausibility factor and validity for a value in context.
///
/// Negative prices and volumes are invalid outright. Everything else only
/// moves confidence: penny-stock and very-high prices stay valid, fractional
/// volumes stay valid, outsized percentages stay valid.
fn context_factor(value: f64, ctx: NumberContext) -> (f64, bool) {
    match ctx {
        NumberContext::Price => {
            if value < 0.0 {
                (0.0, false)
            } else if value > 100_000.0 {
                (0.7, true)
            } else if value > 0.0 && value < 0.01 {
                (0.6, true)
            } else {
                (1.0, true)
            }
        }
        NumberContext::Volume => {
            if value < 0.0 {
                (0.0, false)
            } else if value.fract() != 0.0 {
                (0.7, true)
            } else {
                (1.0, true)
            }
        }
        NumberContext::Percentage => {
            if value.abs() > 50.0 {
                (0.5, true)
            } else if value.abs() > 20.0 {
                (0.8, true)
            } else {
                (1.0, true)
            }
        }
    }
}

/// Format a value the way [`parse_number`] expects to read it back.
///
/// Price: 2 decimal places with standard grouping. Volume: grouped integer.
/// Percentage: 2 decimal places, no sign suffix.
pub fn format_number(value: f64, ctx: NumberContext) -> String {
    match ctx {
        NumberContext::Price => group_thousands(&format!("{value:.2}")),
        NumberContext::Volume => group_thousands(&format!("{:.0}", value.round())),
        NumberContext::Percentage => format!("{value:.2}"),
    }
}

/// Insert standard 3-digit grouping into a formatted decimal string.
fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Aggregate statistics over a batch of parsed numbers.
#[derive(Debug, Clone, Serialize)]
pub struct NumberStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// Values outside the 1.5×IQR fences (valid subset only).
    pub outliers: Vec<f64>,
    /// Mean per-value confidence minus an outlier penalty, floored at 0.1.
    pub confidence: f64,
}

impl NumberStats {
    fn empty() -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            outliers: Vec::new(),
            confidence: 0.1,
        }
    }
}

/// Compute batch statistics over the valid subset of `values`.
///
/// Outliers use the 1.5×IQR rule with inclusive-median quartiles (Tukey
/// hinges). The aggregate confidence is the mean per-value confidence minus
/// the outlier fraction, with the penalty capped at 0.3 and the result
/// floored at 0.1.
pub fn batch_stats(values: &[ParsedNumber]) -> NumberStats {
    let valid: Vec<f64> = values.iter().filter(|p| p.valid).map(|p| p.value).collect();
    if valid.is_empty() {
        return NumberStats::empty();
    }

    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    let mut sorted = valid.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = median_of(&sorted);

    // Inclusive quartiles: both halves contain the middle element when the
    // count is odd, which keeps the fences tight on small batches.
    let half = sorted.len().div_ceil(2);
    let q1 = median_of(&sorted[..half]);
    let q3 = median_of(&sorted[sorted.len() / 2..]);
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let outliers: Vec<f64> = sorted.iter().copied().filter(|v| *v < lo || *v > hi).collect();

    let avg_conf = values.iter().map(|p| p.confidence).sum::<f64>() / values.len() as f64;
    let penalty = (outliers.len() as f64 / valid.len() as f64).min(0.3);
    let confidence = (avg_conf - penalty).max(0.1);

    NumberStats {
        mean,
        median,
        std_dev: variance.sqrt(),
        outliers,
        confidence,
    }
}

fn median_of(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
