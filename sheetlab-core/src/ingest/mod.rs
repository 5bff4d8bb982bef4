//! The ingestion pipeline: raw file → mapped columns → reconciled rows →
//! canonical series.

pub mod fill;
pub mod pipeline;
pub mod reader;
pub mod reconcile;

pub use fill::GapFill;
pub use pipeline::{
    IngestDiagnostics, IngestError, IngestOptions, IngestOutcome, Ingestor, MIN_ROWS,
};
pub use reader::{read_table, read_table_with_limit, RawTable, ReadError, MAX_FILE_BYTES};
pub use reconcile::{reconcile_table, ReconcileStats};
