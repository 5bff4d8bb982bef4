//! The end-to-end ingest pipeline.
//!
//! One call takes a file path through read, column mapping, reconciliation,
//! and the minimum-row gate, and returns a canonical series plus everything
//! a caller needs to judge the result: the mapping with its validation
//! issues, date diagnostics, close-price statistics, and substitution counts.

use super::fill::GapFill;
use super::reader::{read_table_with_limit, ReadError, MAX_FILE_BYTES};
use super::reconcile::{reconcile_table, ReconcileStats};
use crate::domain::CanonicalSeries;
use crate::mapping::{ColumnMapper, FieldCatalog, MappingIssue, MappingResult};
use crate::parse::{batch_stats, batch_validate, DateDiagnostics, NumberStats};
use crate::rng::SeedSource;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Minimum reconciled rows for an ingest to succeed.
pub const MIN_ROWS: usize = 10;

/// Default master seed when the caller doesn't supply one.
pub const DEFAULT_SEED: u64 = 42;

/// Ingest configuration. The defaults match what the dashboard ships with.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Master seed for synthetic-value reconstruction.
    pub master_seed: u64,
    pub min_rows: usize,
    pub max_bytes: u64,
    pub catalog: FieldCatalog,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            master_seed: DEFAULT_SEED,
            min_rows: MIN_ROWS,
            max_bytes: MAX_FILE_BYTES,
            catalog: FieldCatalog::default(),
        }
    }
}

/// Failures that abort an ingest. Cell-level problems never land here;
/// reconciliation absorbs those and reports them as diagnostics.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("only {got} usable rows; need at least {need}")]
    TooFewRows { got: usize, need: usize },
}

/// Everything observed while producing a series.
#[derive(Debug, Clone, Serialize)]
pub struct IngestDiagnostics {
    pub mapping: MappingResult,
    pub issues: Vec<MappingIssue>,
    pub dates: DateDiagnostics,
    pub close_stats: NumberStats,
    pub substitutions: ReconcileStats,
}

/// A successful ingest: the series plus its diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub series: CanonicalSeries,
    pub diagnostics: IngestDiagnostics,
}

/// File-to-series ingestor. Cheap to construct; one instance can ingest any
/// number of files, each reconstructed from its own derived seed stream.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Ingest one file into a canonical series.
    ///
    /// Deterministic: the same file under the same options always produces
    /// the same series, including every synthesized value.
    pub fn ingest(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
        let table = read_table_with_limit(path, self.options.max_bytes)?;

        let mapper = ColumnMapper::new(self.options.catalog.clone());
        let mapping = mapper.map_columns(&table.headers);
        let issues = mapper.validate_mappings(&mapping);

        // Seed stream keyed by file name, so re-ingesting the same file
        // reconstructs identical values no matter what else was ingested.
        let dataset = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut fill = GapFill::new(SeedSource::new(self.options.master_seed).rng_for(&dataset, 0));

        let (rows, stats) = reconcile_table(&table, &mapping, &mut fill);

        if rows.len() < self.options.min_rows {
            return Err(IngestError::TooFewRows {
                got: rows.len(),
                need: self.options.min_rows,
            });
        }

        let dates = batch_validate(&stats.parsed_dates);
        let close_stats = batch_stats(&stats.parsed_closes);

        Ok(IngestOutcome {
            series: CanonicalSeries::from_rows(rows),
            diagnostics: IngestDiagnostics {
                mapping,
                issues,
                dates,
                close_stats,
                substitutions: stats,
            },
        })
    }
}
