//! SheetLab Core — spreadsheet-to-OHLCV ingestion and normalization.
//!
//! This crate turns an arbitrary delimited-text or workbook file with unknown
//! column names and mixed date/number formats into a canonical, date-sorted
//! daily OHLCV series:
//! - Cell parsers with confidence scoring (numbers across grouping/currency
//!   conventions, dates across several structural formats)
//! - Fuzzy column mapping against an immutable field catalog
//! - A reconciliation policy that fills missing fields and repairs rows that
//!   violate OHLC containment, using a seeded RNG for reproducibility
//! - Technical indicators (SMA, EMA, RSI, MACD, Bollinger) over the series
//! - A JSON snapshot model for the exported analysis bundle

pub mod domain;
pub mod indicators;
pub mod ingest;
pub mod mapping;
pub mod parse;
pub mod rng;
pub mod snapshot;
