//! Domain types: raw cells in, canonical rows and series out.

pub mod cell;
pub mod row;
pub mod series;

pub use cell::RawCell;
pub use row::CanonicalRow;
pub use series::CanonicalSeries;
