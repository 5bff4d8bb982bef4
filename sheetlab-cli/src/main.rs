//! SheetLab CLI — inspect, ingest, and snapshot commands.
//!
//! Commands:
//! - `inspect` — map a file's headers onto canonical fields and report issues
//! - `ingest` — run the full pipeline and print a reconciliation summary
//! - `snapshot` — ingest and export the analysis snapshot as JSON

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetlab_core::ingest::{read_table, IngestOptions, Ingestor};
use sheetlab_core::mapping::{ColumnMapper, FieldCatalog};
use sheetlab_core::snapshot::AnalysisSnapshot;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "sheetlab",
    about = "SheetLab CLI — spreadsheet market-data ingestion"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a file's headers onto canonical fields and report issues.
    Inspect {
        /// Input file (.csv .txt .xlsx .xls .xlsm .xlsb .xltx).
        file: PathBuf,

        /// Alternate field catalog (TOML). Defaults to the built-in NSE-style catalog.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Run the full ingest pipeline and print a reconciliation summary.
    Ingest {
        /// Input file.
        file: PathBuf,

        /// Master seed for synthetic-value reconstruction.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Minimum usable rows for the ingest to succeed.
        #[arg(long, default_value_t = 10)]
        min_rows: usize,

        /// Alternate field catalog (TOML).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Ingest a file and export the analysis snapshot as JSON.
    Snapshot {
        /// Input file.
        file: PathBuf,

        /// Output path for the JSON document. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Master seed for synthetic-value reconstruction.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// How many trailing rows to embed in the snapshot.
        #[arg(long, default_value_t = 30)]
        tail: usize,

        /// Alternate field catalog (TOML).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file, catalog } => run_inspect(&file, catalog.as_deref()),
        Commands::Ingest {
            file,
            seed,
            min_rows,
            catalog,
        } => run_ingest(&file, seed, min_rows, catalog.as_deref()),
        Commands::Snapshot {
            file,
            out,
            seed,
            tail,
            catalog,
        } => run_snapshot(&file, out.as_deref(), seed, tail, catalog.as_deref()),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<FieldCatalog> {
    match path {
        Some(path) => {
            let doc = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            FieldCatalog::from_toml(&doc)
                .with_context(|| format!("parsing catalog {}", path.display()))
        }
        None => Ok(FieldCatalog::default()),
    }
}

fn run_inspect(file: &Path, catalog: Option<&Path>) -> Result<()> {
    let table = read_table(file)?;
    let mapper = ColumnMapper::new(load_catalog(catalog)?);
    let mapping = mapper.map_columns(&table.headers);
    let issues = mapper.validate_mappings(&mapping);

    println!("File:       {}", file.display());
    println!("Columns:    {}", table.headers.len());
    println!("Data rows:  {}", table.rows.len());
    println!("Confidence: {:.2}", mapping.confidence);
    println!();
    println!("{:<14} {:<25} {:>10}", "Field", "Column", "Score");
    println!("{}", "-".repeat(51));
    for m in &mapping.mappings {
        match &m.header {
            Some(header) => println!(
                "{:<14} {:<25} {:>10.2}",
                m.field.to_string(),
                header,
                m.confidence
            ),
            None => println!("{:<14} {:<25} {:>10}", m.field.to_string(), "(unmapped)", "-"),
        }
    }

    if !mapping.unmapped_columns.is_empty() {
        println!();
        println!("Unmapped columns: {}", mapping.unmapped_columns.join(", "));
    }
    for s in &mapping.suggestions {
        println!(
            "  hint: '{}' looks like {} (score {:.2})",
            s.header, s.field, s.confidence
        );
    }

    if !issues.is_empty() {
        println!();
        for issue in &issues {
            println!("WARNING: {issue}");
        }
    }

    Ok(())
}

fn run_ingest(file: &Path, seed: u64, min_rows: usize, catalog: Option<&Path>) -> Result<()> {
    let ingestor = Ingestor::new(IngestOptions {
        master_seed: seed,
        min_rows,
        catalog: load_catalog(catalog)?,
        ..Default::default()
    });
    let outcome = ingestor
        .ingest(file)
        .with_context(|| format!("ingesting {}", file.display()))?;

    let series = &outcome.series;
    let diag = &outcome.diagnostics;
    let sub = &diag.substitutions;

    println!();
    println!("=== Ingest Result ===");
    println!("File:            {}", file.display());
    println!("Rows:            {}", series.len());
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("Period:          {first} to {last}");
    }
    println!("Map confidence:  {:.2}", diag.mapping.confidence);
    println!("Close mean:      {:.2}", diag.close_stats.mean);
    println!("Close median:    {:.2}", diag.close_stats.median);
    println!("Close outliers:  {}", diag.close_stats.outliers.len());
    println!("Date gaps:       {}", diag.dates.gaps.len());
    println!();
    println!("--- Substitutions ---");
    println!("Dates:           {}", sub.dates_substituted);
    println!("Opens:           {}", sub.opens_synthesized);
    println!("Ranges:          {}", sub.ranges_adjusted);
    println!("Closes:          {}", sub.closes_defaulted);
    println!("Volumes:         {}", sub.volumes_synthesized);
    println!("Prev closes:     {}", sub.prev_closes_chained);

    for (from, to, days) in &diag.dates.gaps {
        println!("WARNING: {days}-day gap between {from} and {to}");
    }
    for issue in &diag.issues {
        println!("WARNING: {issue}");
    }
    println!();

    Ok(())
}

fn run_snapshot(
    file: &Path,
    out: Option<&Path>,
    seed: u64,
    tail: usize,
    catalog: Option<&Path>,
) -> Result<()> {
    let ingestor = Ingestor::new(IngestOptions {
        master_seed: seed,
        catalog: load_catalog(catalog)?,
        ..Default::default()
    });
    let outcome = ingestor
        .ingest(file)
        .with_context(|| format!("ingesting {}", file.display()))?;

    let source = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let snapshot = AnalysisSnapshot::build(&outcome, &source, tail);
    let json = snapshot.to_json()?;

    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Snapshot saved to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
