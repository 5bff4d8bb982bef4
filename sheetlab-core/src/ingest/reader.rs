//! Raw file readers: delimited text and workbook sheets.
//!
//! Dispatch is by file extension. Delimited files go through the `csv` crate
//! with a sniffed delimiter; workbooks go through `calamine`, first worksheet
//! only. Both produce the same `RawTable` shape: a header row plus rows of
//! typed raw cells, padded to the header width.

use crate::domain::RawCell;
use calamine::{open_workbook_auto, Data, Reader};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Size ceiling enforced before any parsing.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

const DELIMITED_EXTENSIONS: [&str; 2] = ["csv", "txt"];
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "xltx"];

/// Header row plus data rows, before any mapping or parsing.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Column index of an original header, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at (row, column), `Empty` when the row is ragged.
    pub fn cell(&self, row: usize, col: Option<usize>) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        col.and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .unwrap_or(&EMPTY)
    }
}

/// File-level read failures. These abort the ingest; anything cell-level is
/// absorbed downstream by reconciliation.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unsupported file type '.{0}' — accepted: .csv .txt .xlsx .xls .xlsm .xlsb .xltx")]
    UnsupportedExtension(String),

    #[error("file is {bytes} bytes, over the {limit} byte limit")]
    FileTooLarge { bytes: u64, limit: u64 },

    #[error("file contains a header but no data rows")]
    Empty,

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a file into a `RawTable` under the default size ceiling.
pub fn read_table(path: &Path) -> Result<RawTable, ReadError> {
    read_table_with_limit(path, MAX_FILE_BYTES)
}

/// Read a file into a `RawTable`, dispatching on extension.
pub fn read_table_with_limit(path: &Path, limit: u64) -> Result<RawTable, ReadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let bytes = std::fs::metadata(path)?.len();
    if bytes > limit {
        return Err(ReadError::FileTooLarge { bytes, limit });
    }

    if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        read_delimited(path)
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook(path)
    } else {
        Err(ReadError::UnsupportedExtension(ext))
    }
}

/// Pick the delimiter that splits the header line into the most fields.
fn sniff_delimiter(header_line: &str) -> u8 {
    [b',', b'\t', b';', b'|']
        .into_iter()
        .max_by_key(|d| header_line.bytes().filter(|b| b == d).count())
        .unwrap_or(b',')
}

fn read_delimited(path: &Path) -> Result<RawTable, ReadError> {
    let content_head = {
        use std::io::{BufRead, BufReader};
        let mut line = String::new();
        BufReader::new(File::open(path)?).read_line(&mut line)?;
        line
    };
    if content_head.trim().is_empty() {
        return Err(ReadError::Malformed("no header row".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&content_head))
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReadError::Malformed(e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReadError::Malformed(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReadError::Malformed(e.to_string()))?;
        let mut row: Vec<RawCell> = record.iter().map(RawCell::from_text).collect();
        row.resize(headers.len(), RawCell::Empty);
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ReadError::Empty);
    }

    Ok(RawTable { headers, rows })
}

fn read_workbook(path: &Path) -> Result<RawTable, ReadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ReadError::Malformed(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| ReadError::Malformed("workbook has no sheets".into()))?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| ReadError::Malformed(e.to_string()))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| ReadError::Malformed("sheet has no header row".into()))?
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for sheet_row in rows_iter {
        let mut row: Vec<RawCell> = sheet_row.iter().map(convert_cell).collect();
        row.resize(headers.len(), RawCell::Empty);
        // Fully blank lines are common padding at the bottom of sheets.
        if row.iter().all(RawCell::is_empty) {
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ReadError::Empty);
    }

    Ok(RawTable { headers, rows })
}

fn convert_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) => RawCell::from_text(s),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::from_text(s),
        Data::Error(_) => RawCell::Empty,
    }
}
