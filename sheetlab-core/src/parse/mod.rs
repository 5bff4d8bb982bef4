//! Cell-level parsers with confidence scoring.
//!
//! Both parsers are total: they always return a value object carrying a
//! validity flag and a confidence in [0, 1] instead of failing. Cell-level
//! problems never abort an ingest; the reconciliation policy substitutes for
//! anything invalid.

pub mod date;
pub mod number;

pub use date::{batch_validate, parse_date, DateDiagnostics, DateFormat, ParsedDate};
pub use number::{
    batch_stats, format_number, parse_number, NumberContext, NumberStats, ParsedNumber,
};
